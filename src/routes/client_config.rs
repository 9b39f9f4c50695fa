use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::FeatureFlags;
use crate::models::location::{LatLng, DEFAULT_LOCATION_NAME, DEFAULT_POSITION, DEFAULT_ZOOM};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupabaseClientConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultLocation {
    #[serde(flatten)]
    pub position: LatLng,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsClientConfig {
    pub api_key: String,
    pub default_location: DefaultLocation,
    pub default_zoom: u8,
}

/// Runtime equivalent of the generated `config.js`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub supabase: SupabaseClientConfig,
    pub use_supabase: bool,
    pub google_maps: MapsClientConfig,
    pub features: FeatureFlags,
}

pub async fn get_client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    let config = &state.config;
    Json(ClientConfig {
        supabase: SupabaseClientConfig {
            url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        },
        use_supabase: true,
        google_maps: MapsClientConfig {
            api_key: config.google_maps_api_key.clone(),
            default_location: DefaultLocation {
                position: DEFAULT_POSITION,
                name: DEFAULT_LOCATION_NAME,
            },
            default_zoom: DEFAULT_ZOOM,
        },
        features: config.features.clone(),
    })
}
