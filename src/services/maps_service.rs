use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{error, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::models::event::Event;
use crate::models::location::{LatLng, VenueLocation, DEFAULT_LOCATION_NAME, DEFAULT_POSITION, DEFAULT_ZOOM};

const BRAND_BLUE: &str = "#4285F4";
const OVERVIEW_ZOOM: u8 = 12;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub zoom: u8,
    pub map_type_id: &'static str,
    pub styles: JsonValue,
    pub center: LatLng,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub path: &'static str,
    pub scale: u8,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub stroke_color: &'static str,
    pub stroke_weight: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLabel {
    pub text: String,
    pub color: &'static str,
    pub font_size: &'static str,
    pub font_weight: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: Option<LatLng>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<MarkerLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<MarkerIcon>,
    pub draggable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoWindow {
    pub content: String,
}

/// Everything the browser needs to draw a single-venue map.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub container_id: String,
    pub options: MapOptions,
    pub marker: Marker,
    pub info_window: InfoWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn around(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlottedEvent {
    pub marker: Marker,
    pub info_window: InfoWindow,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiMapView {
    pub container_id: String,
    pub options: MapOptions,
    pub markers: Vec<PlottedEvent>,
    pub bounds: Option<Bounds>,
    pub fit_bounds: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOptions {
    pub types: [&'static str; 2],
    pub component_restrictions: JsonValue,
}

/// Address input with autocomplete plus a draggable pin.
#[derive(Debug, Clone, Serialize)]
pub struct LocationPicker {
    pub container_id: String,
    pub options: MapOptions,
    pub autocomplete: AutocompleteOptions,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

/// Coordinates and, when the provider resolved them, the address for a dropped pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinDrop {
    pub position: LatLng,
    pub address: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeEntry {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

fn dark_styles() -> JsonValue {
    json!([
        { "featureType": "all", "elementType": "geometry", "stylers": [{ "color": "#1a1f3a" }] },
        { "featureType": "all", "elementType": "labels.text.fill", "stylers": [{ "color": "#e2e8f0" }] },
        { "featureType": "all", "elementType": "labels.text.stroke", "stylers": [{ "color": "#0a0e27" }] },
        { "featureType": "water", "elementType": "geometry", "stylers": [{ "color": "#4285f4" }, { "lightness": -20 }] },
        { "featureType": "road", "elementType": "geometry", "stylers": [{ "color": "#2d3548" }] }
    ])
}

fn map_options(center: LatLng, zoom: u8) -> MapOptions {
    MapOptions {
        zoom,
        map_type_id: "roadmap",
        styles: dark_styles(),
        center,
    }
}

fn circle_icon(scale: u8, fill_opacity: f64) -> MarkerIcon {
    MarkerIcon {
        path: "CIRCLE",
        scale,
        fill_color: BRAND_BLUE,
        fill_opacity,
        stroke_color: "#ffffff",
        stroke_weight: 2,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn require_container(container_id: &str) -> Result<String> {
    let trimmed = container_id.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest("Map container id is required".to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone)]
pub struct MapsService {
    client: Client,
    base_url: String,
    api_key: String,
    enabled: bool,
}

impl MapsService {
    pub fn new(client: Client, base_url: String, api_key: String, enabled: bool) -> Self {
        Self {
            client,
            base_url,
            api_key,
            enabled,
        }
    }

    /// Single venue map. Falls back to the campus when no coordinates are given.
    pub fn map_view(container_id: &str, location: Option<&VenueLocation>) -> Result<MapView> {
        let container_id = require_container(container_id)?;
        let center = location
            .and_then(VenueLocation::position)
            .unwrap_or(DEFAULT_POSITION);
        let name = location
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| DEFAULT_LOCATION_NAME.to_string());
        let address = location
            .and_then(|l| l.address.clone())
            .unwrap_or_else(|| "Event Venue".to_string());

        let content = format!(
            "<div style=\"color: #1a1f3a; padding: 10px; font-family: 'Inter', sans-serif;\">\
             <h3 style=\"margin: 0 0 8px 0; color: #4285F4; font-weight: 600;\">{}</h3>\
             <p style=\"margin: 0; font-size: 14px;\">{}</p></div>",
            escape_html(&name),
            escape_html(&address)
        );

        Ok(MapView {
            container_id,
            options: map_options(center, DEFAULT_ZOOM),
            marker: Marker {
                position: Some(center),
                title: Some(name),
                animation: Some("DROP"),
                label: None,
                icon: Some(circle_icon(10, 1.0)),
                draggable: false,
            },
            info_window: InfoWindow { content },
        })
    }

    /// Numbered markers for every event that has coordinates. `None` for an empty list.
    pub fn multi_location_view(container_id: &str, events: &[Event]) -> Result<Option<MultiMapView>> {
        let container_id = require_container(container_id)?;
        if events.is_empty() {
            return Ok(None);
        }

        let mut bounds: Option<Bounds> = None;
        let mut markers = Vec::new();

        for (index, event) in events.iter().enumerate() {
            let Some(position) = event.position() else {
                continue;
            };

            let details_link = event
                .id
                .as_deref()
                .map(|id| {
                    format!(
                        "<a href=\"event-details.html?id={}\" style=\"color: #4285F4; text-decoration: none; font-weight: 500;\">View Details →</a>",
                        escape_html(id)
                    )
                })
                .unwrap_or_default();
            let content = format!(
                "<div style=\"color: #1a1f3a; padding: 10px; font-family: 'Inter', sans-serif; min-width: 200px;\">\
                 <h3 style=\"margin: 0 0 8px 0; color: #4285F4; font-weight: 600;\">{}</h3>\
                 <p style=\"margin: 0 0 4px 0; font-size: 13px;\"><strong>Date:</strong> {}</p>\
                 <p style=\"margin: 0 0 8px 0; font-size: 13px;\"><strong>Venue:</strong> {}</p>{}</div>",
                escape_html(&event.event_name),
                escape_html(&event.start_date),
                escape_html(&event.venue),
                details_link
            );

            markers.push(PlottedEvent {
                marker: Marker {
                    position: Some(position),
                    title: Some(event.event_name.clone()),
                    animation: None,
                    label: Some(MarkerLabel {
                        text: (index + 1).to_string(),
                        color: "#ffffff",
                        font_size: "12px",
                        font_weight: "bold",
                    }),
                    icon: Some(circle_icon(15, 0.9)),
                    draggable: false,
                },
                info_window: InfoWindow { content },
            });

            match bounds.as_mut() {
                Some(b) => b.extend(position),
                None => bounds = Some(Bounds::around(position)),
            }
        }

        let fit_bounds = markers.len() > 1;
        Ok(Some(MultiMapView {
            container_id,
            options: map_options(DEFAULT_POSITION, OVERVIEW_ZOOM),
            markers,
            bounds,
            fit_bounds,
        }))
    }

    pub fn location_picker(container_id: &str) -> Result<LocationPicker> {
        Ok(LocationPicker {
            container_id: require_container(container_id)?,
            options: map_options(DEFAULT_POSITION, OVERVIEW_ZOOM),
            autocomplete: AutocompleteOptions {
                types: ["establishment", "geocode"],
                component_restrictions: json!({ "country": "in" }),
            },
            marker: Marker {
                position: None,
                title: None,
                animation: None,
                label: None,
                icon: None,
                draggable: true,
            },
        })
    }

    /// Directions from `origin`; without one, a plain search for the destination.
    pub fn directions_url(origin: Option<LatLng>, destination: LatLng) -> String {
        match origin {
            Some(origin) => format!(
                "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode=driving",
                origin.lat, origin.lng, destination.lat, destination.lng
            ),
            None => format!(
                "https://www.google.com/maps/search/?api=1&query={},{}",
                destination.lat, destination.lng
            ),
        }
    }

    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult> {
        let entry = self.lookup(&[("address", address)]).await?;
        info!(address, "Geocoded address");
        Ok(GeocodeResult {
            lat: entry.geometry.location.lat,
            lng: entry.geometry.location.lng,
            formatted_address: entry.formatted_address,
        })
    }

    pub async fn reverse_geocode(&self, at: LatLng) -> Result<String> {
        let latlng = format!("{},{}", at.lat, at.lng);
        let entry = self.lookup(&[("latlng", latlng.as_str())]).await?;
        Ok(entry.formatted_address)
    }

    /// Reverse geocodes a dragged pin. An unresolvable spot keeps the coordinates only.
    pub async fn pin_dropped(&self, at: LatLng) -> Result<PinDrop> {
        let address = match self.reverse_geocode(at).await {
            Ok(address) => Some(address),
            Err(Error::GeocodingFailed { status }) => {
                warn!(%status, lat = at.lat, lng = at.lng, "Pin dropped on unresolvable location");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(PinDrop {
            position: at,
            address,
        })
    }

    async fn lookup(&self, params: &[(&str, &str)]) -> Result<GeocodeEntry> {
        if !self.enabled || self.api_key.is_empty() {
            return Err(Error::ProviderUnavailable("Google Maps not loaded".to_string()));
        }

        let mut url = Url::parse(&format!("{}/maps/api/geocode/json", self.base_url))
            .map_err(|e| Error::Config(format!("Invalid maps base URL: {}", e)))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().copied())
            .append_pair("key", &self.api_key);

        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = %e, "Geocoding request failed");
            Error::Reqwest(e)
        })?;
        let body: GeocodeResponse = response.json().await?;

        if body.status != "OK" {
            error!(
                status = %body.status,
                message = body.error_message.as_deref().unwrap_or(""),
                "Geocoding failed"
            );
            return Err(Error::GeocodingFailed { status: body.status });
        }

        body.results
            .into_iter()
            .next()
            .ok_or(Error::GeocodingFailed { status: body.status })
    }
}
