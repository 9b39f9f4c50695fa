use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    dto::maps_dto::{
        CoordinatesQuery, DirectionsQuery, DirectionsResponse, GeocodeQuery, MapViewPayload,
        MultiMapPayload, PickerQuery,
    },
    error::Result,
    services::maps_service::MapsService,
    AppState,
};

pub async fn map_view(Json(payload): Json<MapViewPayload>) -> Result<impl IntoResponse> {
    let view = MapsService::map_view(&payload.container_id, payload.location.as_ref())?;
    Ok(Json(view))
}

/// 204 when there is nothing to plot.
pub async fn events_map(Json(payload): Json<MultiMapPayload>) -> Result<impl IntoResponse> {
    let view = MapsService::multi_location_view(&payload.container_id, &payload.events)?;
    Ok(match view {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let result = state.maps_service.geocode(&query.address).await?;
    Ok(Json(result))
}

pub async fn reverse_geocode(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let drop = state.maps_service.pin_dropped(query.position()).await?;
    Ok(Json(drop))
}

pub async fn directions(Query(query): Query<DirectionsQuery>) -> impl IntoResponse {
    Json(DirectionsResponse {
        url: MapsService::directions_url(query.origin(), query.destination()),
        target: "_blank",
    })
}

pub async fn location_picker(Query(query): Query<PickerQuery>) -> Result<impl IntoResponse> {
    let picker = MapsService::location_picker(&query.container_id)?;
    Ok(Json(picker))
}
