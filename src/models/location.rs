//! Geocoding results.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Entry of the provider's `/direct` geocoding response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Location match returned to callers, in provider ranking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct LocationMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// `"name, state, country"`, with the state omitted when unknown
    pub display_name: String,
}

impl From<GeoLocation> for LocationMatch {
    fn from(location: GeoLocation) -> Self {
        let state = location.state.filter(|s| !s.trim().is_empty());
        let display_name = [
            Some(location.name.as_str()),
            state.as_deref(),
            Some(location.country.as_str()).filter(|c| !c.is_empty()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            name: location.name,
            lat: location.lat,
            lon: location.lon,
            country: location.country,
            state,
            display_name,
        }
    }
}
