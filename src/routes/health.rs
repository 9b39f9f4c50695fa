use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let signed_in = state.auth.read().await.signed_in();
    let body = json!({
        "status": "ok",
        "sheets_users": signed_in,
        "active_writers": state.attendance_service.active_writers(),
        "maps_enabled": state.config.maps_enabled(),
    });
    (StatusCode::OK, Json(body))
}
