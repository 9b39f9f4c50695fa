use rust_xlsxwriter::*;
use serde_json::{json, Value as JsonValue};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::models::attendance::SheetHandle;
use crate::models::od_form::OdForm;
use crate::services::sheet_requests::{auto_resize_columns, header_band, HEADER_BLUE};
use crate::services::sheets_client::{NewSpreadsheet, Rows, SheetsApi};
use crate::utils::a1::A1Range;
use crate::utils::time;

pub const EXPORT_HEADERS: [&str; 10] = [
    "Form Reference",
    "Student Name",
    "PRN",
    "Event Name",
    "Event Type",
    "Start Date",
    "End Date",
    "Venue",
    "Status",
    "Submission Date",
];

// Default tab of a document created without explicit sheets.
const EXPORT_SHEET: &str = "Sheet1";

pub struct ExportService;

impl ExportService {
    fn form_cells(form: &OdForm) -> [String; 10] {
        [
            form.form_reference.clone(),
            form.student_name.clone(),
            form.prn.clone(),
            form.event_name.clone(),
            form.event_type.clone(),
            form.start_date.clone(),
            form.end_date.clone(),
            form.venue.clone(),
            form.status.clone(),
            time::local_date(form.submitted_at),
        ]
    }

    /// Header row followed by one row per form, in input order.
    pub fn form_rows(forms: &[OdForm]) -> Rows {
        let header: Vec<JsonValue> = EXPORT_HEADERS.iter().map(|h| json!(h)).collect();
        std::iter::once(header)
            .chain(forms.iter().map(|f| {
                Self::form_cells(f)
                    .into_iter()
                    .map(JsonValue::String)
                    .collect::<Vec<_>>()
            }))
            .collect()
    }

    /// Writes every form into a fresh spreadsheet with a single values update.
    pub async fn export_forms_to_sheet<C: SheetsApi>(client: &C, forms: &[OdForm]) -> Result<SheetHandle> {
        let doc = NewSpreadsheet {
            title: format!("OD Forms Export - {}", time::sheet_date(&time::now())),
            tabs: Vec::new(),
        };

        let result: Result<SheetHandle> = async {
            let spreadsheet_id = client.create_spreadsheet(&doc).await?;
            client
                .update_values(
                    &spreadsheet_id,
                    &A1Range::cell(EXPORT_SHEET, 0, 1),
                    Self::form_rows(forms),
                )
                .await?;
            client
                .batch_update(
                    &spreadsheet_id,
                    vec![
                        header_band(0, 0, HEADER_BLUE, 11, false),
                        auto_resize_columns(0, 0, EXPORT_HEADERS.len() as u32),
                    ],
                )
                .await?;
            Ok::<_, Error>(SheetHandle::from_id(spreadsheet_id))
        }
        .await;

        match &result {
            Ok(handle) => info!(spreadsheet_id = %handle.spreadsheet_id, forms = forms.len(), "OD forms exported"),
            Err(e) => error!(error = %e, "Error exporting to sheets"),
        }
        result
    }

    /// Generate a styled XLSX workbook from a list of OD forms.
    pub fn generate_forms_xlsx(forms: &[OdForm]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("OD Forms")?;

        // ── Color palette ──
        let primary_color = Color::RGB(0x1A1F3A);
        let header_bg = Color::RGB(0x4285F4);
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC);
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0);

        let status_approved = Color::RGB(0x10B981);
        let status_pending = Color::RGB(0xF59E0B);
        let status_rejected = Color::RGB(0xEF4444);

        let widths = [18.0, 28.0, 14.0, 30.0, 16.0, 14.0, 14.0, 30.0, 14.0, 18.0];
        for (i, width) in widths.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }
        let last_col = (EXPORT_HEADERS.len() - 1) as u16;

        // ── Title row ──
        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(0, 40)?;
        worksheet.merge_range(0, 0, 0, last_col, "OD Forms Export", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(1, 22)?;
        let subtitle_text = format!(
            "Exported: {}  •  Total forms: {}",
            time::sheet_timestamp(time::now()),
            forms.len()
        );
        worksheet.merge_range(1, 0, 1, last_col, &subtitle_text, &subtitle_format)?;

        // ── Header row ──
        let header_format = Format::new()
            .set_bold()
            .set_font_size(11)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let header_row = 2;
        worksheet.set_row_height(header_row, 28)?;
        for (i, name) in EXPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        // ── Data rows ──
        let data_start_row = 3;
        for (idx, form) in forms.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            for (col, value) in Self::form_cells(form).iter().enumerate() {
                if col == 8 {
                    let status_color = match form.status.to_ascii_lowercase().as_str() {
                        "approved" => status_approved,
                        "pending" => status_pending,
                        "rejected" => status_rejected,
                        _ => Color::RGB(0x64748B),
                    };
                    let status_fmt = Format::new()
                        .set_font_size(10)
                        .set_bold()
                        .set_font_color(Color::White)
                        .set_background_color(status_color)
                        .set_align(FormatAlign::Center)
                        .set_align(FormatAlign::VerticalCenter)
                        .set_border(FormatBorder::Thin)
                        .set_border_color(border_color);
                    worksheet.write_string_with_format(row, col as u16, value, &status_fmt)?;
                } else {
                    worksheet.write_string_with_format(row, col as u16, value, &base_fmt)?;
                }
            }
        }

        // ── Summary row ──
        let total_row = data_start_row + forms.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary_color)
            .set_background_color(Color::RGB(0xE0E7FF))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let count = |status: &str| {
            forms
                .iter()
                .filter(|f| f.status.eq_ignore_ascii_case(status))
                .count()
        };
        let summary = format!(
            "Total: {} | Approved: {} | Pending: {} | Rejected: {}",
            forms.len(),
            count("approved"),
            count("pending"),
            count("rejected")
        );
        worksheet.merge_range(total_row, 0, total_row, last_col, &summary, &summary_fmt)?;

        worksheet.set_freeze_panes(3, 0)?;
        worksheet.autofilter(
            header_row,
            0,
            (data_start_row + forms.len() as u32).saturating_sub(1).max(header_row),
            last_col,
        )?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
