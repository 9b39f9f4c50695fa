use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::attendance_dto::SheetCreatedResponse, dto::export_dto::ExportFormsPayload,
    error::Result, middleware::auth::Claims, services::export_service::ExportService,
    AppState,
};

/// Export OD forms into a new Google spreadsheet
pub async fn export_forms_to_sheet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ExportFormsPayload>,
) -> Result<impl IntoResponse> {
    let client = state.sheets_client(&claims.sub).await?;
    let handle = ExportService::export_forms_to_sheet(&client, &payload.forms).await?;

    Ok((
        StatusCode::CREATED,
        Json(SheetCreatedResponse {
            handle,
            success: true,
        }),
    ))
}

/// Export OD forms as XLSX
pub async fn export_forms_xlsx(Json(payload): Json<ExportFormsPayload>) -> Result<impl IntoResponse> {
    let buffer = ExportService::generate_forms_xlsx(&payload.forms)?;
    let filename = format!(
        "od_forms_export_{}.xlsx",
        chrono::Utc::now().format("%Y%m%d_%H%M")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
