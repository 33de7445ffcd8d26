//! Request and response models for the HTTP surface.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    /// Active rate limiter backend
    pub rate_limiter: String,
    /// Whether history storage is configured
    pub history_store: bool,
}

/// Response model for the version information endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

/// Endpoint catalogue of the API index
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ApiEndpoints {
    pub weather: String,
    pub location: String,
    pub history: String,
    pub health: String,
    pub version: String,
    pub documentation: String,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ApiIndexResponse {
    pub message: String,
    pub description: String,
    pub endpoints: ApiEndpoints,
}

/// Query parameters for the weather endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct WeatherQuery {
    /// Latitude coordinate, -90 to 90
    pub lat: Option<f64>,
    /// Longitude coordinate, -180 to 180
    pub lon: Option<f64>,
    /// `true` bypasses cached data
    pub refresh: Option<String>,
}

/// Query parameters for the location search endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct LocationQuery {
    /// Free-text place name, e.g. "London" or "Springfield, US"
    pub q: Option<String>,
    /// Maximum number of matches, 1 to 5 (default 5)
    pub limit: Option<u8>,
}

/// Body of `POST /api/history`
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHistoryRequest {
    pub location_name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Temperature in °C at search time
    pub temperature: Option<f64>,
    /// Omitted for anonymous searches
    pub user_id: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct CreateHistoryResponse {
    pub success: bool,
    pub id: String,
}

/// Body of `DELETE /api/history`
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteHistoryRequest {
    pub entry_id: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct DeleteHistoryResponse {
    pub success: bool,
    pub message: String,
}
