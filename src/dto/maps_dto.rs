use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::event::Event;
use crate::models::location::{LatLng, VenueLocation};

#[derive(Debug, Deserialize)]
pub struct MapViewPayload {
    pub container_id: String,
    pub location: Option<VenueLocation>,
}

#[derive(Debug, Deserialize)]
pub struct MultiMapPayload {
    pub container_id: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GeocodeQuery {
    #[validate(length(min = 1))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CoordinatesQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

impl CoordinatesQuery {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[derive(Debug, Deserialize)]
pub struct DirectionsQuery {
    pub dest_lat: f64,
    pub dest_lng: f64,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
}

impl DirectionsQuery {
    pub fn origin(&self) -> Option<LatLng> {
        Some(LatLng::new(self.origin_lat?, self.origin_lng?))
    }

    pub fn destination(&self) -> LatLng {
        LatLng::new(self.dest_lat, self.dest_lng)
    }
}

#[derive(Debug, Deserialize)]
pub struct PickerQuery {
    pub container_id: String,
}

#[derive(Debug, Serialize)]
pub struct DirectionsResponse {
    pub url: String,
    pub target: &'static str,
}
