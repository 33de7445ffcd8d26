//! Weather provider payloads and the shapes derived from them.
//!
//! Provider types mirror the OpenWeatherMap 2.5 JSON closely enough to pass the
//! current-conditions document straight through to callers.

use crate::{error::ApiError, services::condition::ConditionCategory};
use chrono::{DateTime, NaiveDate, Utc};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Provider condition entry (`weather[]` in OpenWeatherMap responses)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Apiv2Schema)]
pub struct WeatherCondition {
    pub id: u16,
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl WeatherCondition {
    /// Placeholder for samples the provider sent without any condition.
    pub fn unknown() -> Self {
        Self {
            id: 0,
            main: "Unknown".to_string(),
            description: String::new(),
            icon: String::new(),
        }
    }

    pub fn category(&self) -> ConditionCategory {
        match ConditionCategory::from_label(&self.main) {
            ConditionCategory::FALLBACK => ConditionCategory::from_condition_id(self.id),
            category => category,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    pub humidity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sea_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grnd_level: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct Clouds {
    pub all: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
}

/// Current conditions as returned by the provider's `/weather` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct CurrentWeather {
    pub coord: Coord,
    pub weather: Vec<WeatherCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub main: MainReadings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    pub wind: Wind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<Clouds>,
    pub dt: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<SunInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    /// Filled in locally from the first condition; never sent by the provider.
    #[serde(default, skip_deserializing)]
    pub category: Option<ConditionCategory>,
}

impl CurrentWeather {
    pub fn classify(mut self) -> Self {
        self.category = Some(
            self.weather
                .first()
                .map(WeatherCondition::category)
                .unwrap_or(ConditionCategory::FALLBACK),
        );
        self
    }
}

/// Provider `/forecast` document: 3-hourly entries for the next five days.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastItem>,
    pub city: ForecastCity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    /// Shift from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub wind: Wind,
}

impl ForecastItem {
    /// `None` when `dt` is outside the representable time range.
    pub fn to_sample(&self) -> Option<RawForecastSample> {
        Some(RawForecastSample {
            timestamp: DateTime::from_timestamp(self.dt, 0)?,
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            condition: self
                .weather
                .first()
                .cloned()
                .unwrap_or_else(WeatherCondition::unknown),
        })
    }
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
}

/// Daily roll-up of the samples that fall on one local calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct DailyForecastSummary {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_avg: f64,
    /// Most frequent condition of the day
    pub weather: WeatherCondition,
    pub category: ConditionCategory,
    pub humidity_avg: f64,
    pub wind_avg: f64,
}

/// Combined response of the weather endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct WeatherPayload {
    pub current: CurrentWeather,
    pub forecast: Vec<DailyForecastSummary>,
}

/// Validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: Option<f64>, lon: Option<f64>) -> Result<Self, ApiError> {
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(ApiError::validation("Latitude and Longitude are required"));
        };
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::validation("Latitude must be between -90 and 90"));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ApiError::validation("Longitude must be between -180 and 180"));
        }
        Ok(Self { lat, lon })
    }
}
