//! Search history records.

use crate::error::ApiError;
use chrono::{DateTime, SecondsFormat, Utc};
use paperclip::actix::Apiv2Schema;
use serde::Serialize;

/// Who a history entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOwner {
    User(String),
    /// Searches made without a signed-in user
    Guest,
}

impl HistoryOwner {
    pub const GUEST_ID: &'static str = "guest";

    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::User(id.to_string()),
            _ => Self::Guest,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::User(id) => id,
            Self::Guest => Self::GUEST_ID,
        }
    }
}

/// A search about to be recorded, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSearchHistory {
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature: f64,
    pub owner: HistoryOwner,
}

impl NewSearchHistory {
    pub fn new(
        location_name: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
        temperature: Option<f64>,
        user_id: Option<&str>,
    ) -> Result<Self, ApiError> {
        let location_name = location_name.map(str::trim).unwrap_or_default();
        let (Some(lat), Some(lon), Some(temperature)) = (lat, lon, temperature) else {
            return Err(Self::missing_fields());
        };
        if location_name.is_empty()
            || !lat.is_finite()
            || !lon.is_finite()
            || !temperature.is_finite()
        {
            return Err(Self::missing_fields());
        }

        Ok(Self {
            location_name: location_name.to_string(),
            lat,
            lon,
            temperature,
            owner: HistoryOwner::from_user_id(user_id),
        })
    }

    fn missing_fields() -> ApiError {
        ApiError::validation("Missing required fields (locationName, lat, lon, temperature)")
    }

    /// URL slug: lower-cased, whitespace runs replaced by `-`.
    pub fn slug(&self) -> String {
        self.location_name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Stored history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHistoryRecord {
    pub id: String,
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
}

/// History list item as served to callers.
#[derive(Debug, Clone, Serialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Temperature with unit, e.g. `"14.3°C"`
    pub temp: String,
    pub timestamp: String,
    pub user_id: String,
}

impl From<&SearchHistoryRecord> for HistoryEntryResponse {
    fn from(record: &SearchHistoryRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.location_name.clone(),
            lat: record.lat,
            lon: record.lon,
            temp: format!("{}°C", record.temperature),
            timestamp: record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            user_id: record.user_id.clone(),
        }
    }
}
