use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Student {
    #[validate(length(min = 1))]
    pub prn: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    pub department: String,
    pub year: String,
    pub division: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

/// Opaque reference to a spreadsheet created by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetHandle {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
}

impl SheetHandle {
    pub fn from_id(spreadsheet_id: impl Into<String>) -> Self {
        let spreadsheet_id = spreadsheet_id.into();
        let spreadsheet_url = format!("https://docs.google.com/spreadsheets/d/{}", spreadsheet_id);
        Self {
            spreadsheet_id,
            spreadsheet_url,
        }
    }
}

/// One line of the Attendance tab, columns A through J.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRow {
    pub serial: Option<u32>,
    pub prn: String,
    pub student_name: String,
    pub department: String,
    pub year: String,
    pub division: String,
    pub check_in: String,
    pub check_out: Option<String>,
    pub status: String,
    pub remarks: String,
}

impl AttendanceRow {
    /// Sheets drops trailing empty cells, so short rows are padded with blanks.
    pub fn from_cells(cells: &[JsonValue]) -> Self {
        let text = |idx: usize| cells.get(idx).map(cell_text).unwrap_or_default();
        let check_out = text(7);

        Self {
            serial: text(0).trim().parse().ok(),
            prn: text(1),
            student_name: text(2),
            department: text(3),
            year: text(4),
            division: text(5),
            check_in: text(6),
            check_out: (!check_out.is_empty()).then_some(check_out),
            status: text(8),
            remarks: text(9),
        }
    }
}

/// Renders a cell the way the sheet displays it.
pub fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub rate: f64,
}

impl Statistics {
    /// Counts a full status column, header row included.
    pub fn from_status_column(rows: &[Vec<JsonValue>]) -> Self {
        let body = rows.iter().skip(1);
        let total = rows.len().saturating_sub(1) as u32;
        let count = |status: AttendanceStatus| {
            body.clone()
                .filter(|row| row.first().map(cell_text).as_deref() == Some(status.as_str()))
                .count() as u32
        };
        let present = count(AttendanceStatus::Present);
        let absent = count(AttendanceStatus::Absent);
        let rate = if total > 0 {
            (present as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total,
            present,
            absent,
            rate,
        }
    }

    pub fn rate_label(&self) -> String {
        if self.total > 0 {
            format!("{:.2}%", self.rate)
        } else {
            "0%".to_string()
        }
    }
}

/// Outcome of the recomputation that follows an attendance mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatisticsOutcome {
    Updated(Statistics),
    Failed { reason: String },
}

impl StatisticsOutcome {
    pub fn statistics(&self) -> Option<&Statistics> {
        match self {
            StatisticsOutcome::Updated(stats) => Some(stats),
            StatisticsOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckIn {
    pub row: u32,
    pub serial: u32,
    pub checked_in_at: String,
    pub statistics: StatisticsOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOut {
    pub row: u32,
    pub checked_out_at: String,
}
