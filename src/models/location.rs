use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A named place shown on a map. `address` feeds the info window body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueLocation {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl VenueLocation {
    pub fn position(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        }
    }
}

pub const DEFAULT_POSITION: LatLng = LatLng::new(18.4538, 73.8636);
pub const DEFAULT_LOCATION_NAME: &str = "Bharati Vidyapeeth Deemed University, Pune";
pub const DEFAULT_ZOOM: u8 = 15;
