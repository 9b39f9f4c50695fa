//! `batchUpdate` request bodies for header styling.

use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone, Copy)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

pub const HEADER_BLUE: Rgb = Rgb {
    red: 0.26,
    green: 0.52,
    blue: 0.96,
};

pub const SUMMARY_GREEN: Rgb = Rgb {
    red: 0.2,
    green: 0.66,
    blue: 0.33,
};

impl Rgb {
    fn to_json(self) -> JsonValue {
        json!({ "red": self.red, "green": self.green, "blue": self.blue })
    }
}

/// Bold white text on a coloured band covering one row.
pub fn header_band(sheet_id: i64, row_index: u32, background: Rgb, font_size: u32, centered: bool) -> JsonValue {
    let mut format = json!({
        "backgroundColor": background.to_json(),
        "textFormat": {
            "foregroundColor": { "red": 1, "green": 1, "blue": 1 },
            "fontSize": font_size,
            "bold": true
        }
    });
    let fields = if centered {
        format["horizontalAlignment"] = json!("CENTER");
        "userEnteredFormat(backgroundColor,textFormat,horizontalAlignment)"
    } else {
        "userEnteredFormat(backgroundColor,textFormat)"
    };

    json!({
        "repeatCell": {
            "range": {
                "sheetId": sheet_id,
                "startRowIndex": row_index,
                "endRowIndex": row_index + 1
            },
            "cell": { "userEnteredFormat": format },
            "fields": fields
        }
    })
}

pub fn auto_resize_columns(sheet_id: i64, start: u32, end: u32) -> JsonValue {
    json!({
        "autoResizeDimensions": {
            "dimensions": {
                "sheetId": sheet_id,
                "dimension": "COLUMNS",
                "startIndex": start,
                "endIndex": end
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_band_lists_alignment_field() {
        let req = header_band(0, 0, HEADER_BLUE, 11, true);
        assert_eq!(
            req["repeatCell"]["fields"],
            "userEnteredFormat(backgroundColor,textFormat,horizontalAlignment)"
        );
        assert_eq!(req["repeatCell"]["range"]["endRowIndex"], 1);
        assert_eq!(
            req["repeatCell"]["cell"]["userEnteredFormat"]["horizontalAlignment"],
            "CENTER"
        );
    }

    #[test]
    fn plain_band_has_no_alignment() {
        let req = header_band(1, 6, SUMMARY_GREEN, 12, false);
        assert!(req["repeatCell"]["cell"]["userEnteredFormat"]
            .get("horizontalAlignment")
            .is_none());
        assert_eq!(req["repeatCell"]["range"]["startRowIndex"], 6);
    }
}
