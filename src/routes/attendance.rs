use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::attendance_dto::{
        CheckInPayload, CheckOutPayload, CreateSheetPayload, SharePayload, SheetCreatedResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::attendance::SheetHandle,
    AppState,
};

/// Create the attendance spreadsheet for an event
pub async fn create_sheet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSheetPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let client = state.sheets_client(&claims.sub).await?;
    let handle = state
        .attendance_service
        .create_sheet(&client, &payload.event)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SheetCreatedResponse {
            handle,
            success: true,
        }),
    ))
}

pub async fn check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(spreadsheet_id): Path<String>,
    Json(payload): Json<CheckInPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let client = state.sheets_client(&claims.sub).await?;
    let handle = SheetHandle::from_id(spreadsheet_id);
    let check_in = state
        .attendance_service
        .mark_check_in(&client, &handle, &payload.student)
        .await?;

    Ok(Json(json!({
        "success": true,
        "row": check_in.row,
        "serial": check_in.serial,
        "checked_in_at": check_in.checked_in_at,
        "statistics": check_in.statistics,
        "message": "Attendance marked successfully",
    })))
}

pub async fn check_out(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(spreadsheet_id): Path<String>,
    Json(payload): Json<CheckOutPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let client = state.sheets_client(&claims.sub).await?;
    let handle = SheetHandle::from_id(spreadsheet_id);
    let check_out = state
        .attendance_service
        .mark_check_out(&client, &handle, &payload.prn)
        .await?;

    Ok(Json(json!({
        "success": true,
        "row": check_out.row,
        "checked_out_at": check_out.checked_out_at,
        "message": "Check-out time recorded successfully",
    })))
}

pub async fn recompute_statistics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(spreadsheet_id): Path<String>,
) -> Result<impl IntoResponse> {
    let client = state.sheets_client(&claims.sub).await?;
    let handle = SheetHandle::from_id(spreadsheet_id);
    let stats = state
        .attendance_service
        .recompute_statistics(&client, &handle)
        .await?;

    Ok(Json(json!({
        "total": stats.total,
        "present": stats.present,
        "absent": stats.absent,
        "rate": stats.rate,
        "rate_label": stats.rate_label(),
    })))
}

pub async fn list_rows(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(spreadsheet_id): Path<String>,
) -> Result<impl IntoResponse> {
    let client = state.sheets_client(&claims.sub).await?;
    let handle = SheetHandle::from_id(spreadsheet_id);
    let rows = state
        .attendance_service
        .attendance_rows(&client, &handle)
        .await?;
    Ok(Json(rows))
}

pub async fn share(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(spreadsheet_id): Path<String>,
    Json(payload): Json<SharePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let client = state.sheets_client(&claims.sub).await?;
    let handle = SheetHandle::from_id(spreadsheet_id);
    state
        .attendance_service
        .share(&client, &handle, &payload.emails, payload.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
