pub mod attendance;
pub mod auth;
pub mod client_config;
pub mod export;
pub mod health;
pub mod maps;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::{require_supabase_user, AuthKeys};
use crate::middleware::cors::cors_layer;
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Full application router: base routes, the public group and the
/// Supabase-protected group, each group behind its own rate limiter.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/config", get(client_config::get_client_config));

    let public_api = Router::new()
        .route("/api/auth/google/callback", get(auth::callback))
        .route("/api/maps/view", post(maps::map_view))
        .route("/api/maps/events", post(maps::events_map))
        .route("/api/maps/geocode", get(maps::geocode))
        .route("/api/maps/reverse-geocode", get(maps::reverse_geocode))
        .route("/api/maps/directions", get(maps::directions))
        .route("/api/maps/picker", get(maps::location_picker))
        .layer(from_fn_with_state(
            RateLimiter::per_second(config.api_rps),
            rps_middleware,
        ));

    let protected_api = Router::new()
        .route("/api/auth/google/init", post(auth::init_clients))
        .route("/api/auth/google/consent", get(auth::consent))
        .route("/api/auth/google/refresh", post(auth::refresh))
        .route("/api/attendance/sheets", post(attendance::create_sheet))
        .route(
            "/api/attendance/sheets/:id/check-in",
            post(attendance::check_in),
        )
        .route(
            "/api/attendance/sheets/:id/check-out",
            post(attendance::check_out),
        )
        .route(
            "/api/attendance/sheets/:id/statistics",
            post(attendance::recompute_statistics),
        )
        .route("/api/attendance/sheets/:id/share", post(attendance::share))
        .route("/api/attendance/sheets/:id/rows", get(attendance::list_rows))
        .route(
            "/api/export/forms/sheet",
            post(export::export_forms_to_sheet),
        )
        .route("/api/export/forms/xlsx", post(export::export_forms_xlsx))
        .layer(from_fn_with_state(
            AuthKeys::new(&config.supabase_jwt_secret),
            require_supabase_user,
        ))
        .layer(from_fn_with_state(
            RateLimiter::per_second(config.api_rps),
            rps_middleware,
        ));

    base_routes
        .merge(public_api)
        .merge(protected_api)
        .with_state(state)
        .layer(cors_layer(config.cors_allowed_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}
