mod common;

use campusflow_backend::models::od_form::OdForm;
use campusflow_backend::services::export_service::{ExportService, EXPORT_HEADERS};
use chrono::{TimeZone, Utc};
use common::InMemorySheets;
use serde_json::json;

fn form(reference: &str, status: &str) -> OdForm {
    OdForm {
        form_reference: reference.into(),
        student_name: "Asha Patil".into(),
        prn: "2021001".into(),
        event_name: "Tech Fest".into(),
        event_type: "Technical".into(),
        start_date: "2024-03-01".into(),
        end_date: "2024-03-02".into(),
        venue: "Main Auditorium".into(),
        status: status.into(),
        submitted_at: Utc.with_ymd_and_hms(2024, 2, 20, 6, 0, 0).unwrap(),
    }
}

#[test]
fn rows_keep_input_order_under_the_header() {
    let rows = ExportService::form_rows(&[form("OD-002", "pending"), form("OD-001", "approved")]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], EXPORT_HEADERS.iter().map(|h| json!(h)).collect::<Vec<_>>());
    assert_eq!(rows[1][0], json!("OD-002"));
    assert_eq!(rows[2][0], json!("OD-001"));
    assert_eq!(rows[2][8], json!("approved"));
    assert_eq!(rows[1].len(), 10);
}

#[tokio::test]
async fn export_writes_everything_into_a_new_document() {
    let sheets = InMemorySheets::new();
    let forms = vec![form("OD-001", "approved"), form("OD-002", "rejected")];

    let handle = ExportService::export_forms_to_sheet(&sheets, &forms).await.unwrap();

    let id = handle.spreadsheet_id.as_str();
    assert_eq!(sheets.row(id, "Sheet1", 1)[0], json!("Form Reference"));
    assert_eq!(sheets.row(id, "Sheet1", 1)[9], json!("Submission Date"));
    assert_eq!(sheets.row(id, "Sheet1", 2)[0], json!("OD-001"));
    assert_eq!(sheets.row(id, "Sheet1", 3)[8], json!("rejected"));
    sheets.with_doc(id, |doc| {
        assert!(doc.title.starts_with("OD Forms Export - "));
        assert_eq!(doc.requests.len(), 2);
    });
}

#[tokio::test]
async fn empty_export_still_writes_the_header() {
    let sheets = InMemorySheets::new();
    let handle = ExportService::export_forms_to_sheet(&sheets, &[]).await.unwrap();
    let header = sheets.row(&handle.spreadsheet_id, "Sheet1", 1);
    assert_eq!(header.len(), EXPORT_HEADERS.len());
    assert!(sheets.row(&handle.spreadsheet_id, "Sheet1", 2).is_empty());
}

#[test]
fn xlsx_export_produces_a_workbook() {
    let bytes = ExportService::generate_forms_xlsx(&[form("OD-001", "approved")]).unwrap();
    assert!(bytes.starts_with(b"PK"));

    let empty = ExportService::generate_forms_xlsx(&[]).unwrap();
    assert!(!empty.is_empty());
}
