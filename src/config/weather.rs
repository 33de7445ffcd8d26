//! Weather provider configuration.

use super::non_empty_var;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEOCODING_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Configuration for the OpenWeatherMap-compatible provider.
///
/// A missing API key is not fatal at startup: requests that need the provider
/// fail with a configuration error instead, which keeps history and health
/// endpoints usable.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub geocoding_base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            geocoding_base_url: DEFAULT_GEOCODING_BASE_URL.to_string(),
        }
    }
}

impl WeatherConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_var("OPENWEATHER_API_KEY"),
            base_url: non_empty_var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            geocoding_base_url: non_empty_var("OPENWEATHER_GEO_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODING_BASE_URL.to_string()),
        }
    }
}
