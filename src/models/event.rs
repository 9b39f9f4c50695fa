use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::location::LatLng;

// Coordinates arrive from the database either as numbers or as numeric strings.
fn deserialize_coordinate<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Invalid coordinate: {}", s))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1))]
    pub event_name: String,
    pub event_type: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub venue: String,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub longitude: Option<f64>,
}

impl Event {
    /// Zero coordinates count as unset, the way the forms store a blank pin.
    pub fn position(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(LatLng::new(lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_accept_strings_and_numbers() {
        let event: Event = serde_json::from_value(json!({
            "event_name": "Tech Fest 2024",
            "event_type": "Technical",
            "start_date": "2024-03-01",
            "venue": "Main Auditorium",
            "latitude": "18.4575",
            "longitude": 73.8508
        }))
        .unwrap();

        assert_eq!(event.position(), Some(LatLng::new(18.4575, 73.8508)));
    }

    #[test]
    fn blank_coordinates_mean_no_position() {
        let event: Event = serde_json::from_value(json!({
            "event_name": "Seminar",
            "event_type": "Academic",
            "start_date": "2024-03-01",
            "venue": "Hall B",
            "latitude": "",
            "longitude": null
        }))
        .unwrap();

        assert_eq!(event.position(), None);
    }
}
