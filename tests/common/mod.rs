//! Shared fixtures for integration tests.
#![allow(dead_code)]

use weatherscope_api::{
    AppConfig, AppServices, RateLimitBackend, RateLimitConfig,
    config::{HistoryConfig, LoggingConfig, ServerConfig, UpstreamClientConfig, WeatherConfig},
};
use wiremock::MockServer;

/// Configuration pointing every upstream at `server`, with the in-memory limiter.
pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        logging: LoggingConfig::default(),
        weather: WeatherConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            geocoding_base_url: server.uri(),
        },
        history: HistoryConfig {
            base_url: Some(server.uri()),
            api_key: Some("cms-key".to_string()),
            ..HistoryConfig::default()
        },
        rate_limit: RateLimitConfig::with_backend(RateLimitBackend::InMemory),
        upstream_client: UpstreamClientConfig::default(),
    }
}

pub fn test_services(server: &MockServer) -> AppServices {
    AppServices::from_config(&test_config(server)).expect("services")
}

pub fn current_weather_body() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lat": 40.71, "lon": -74.01},
        "weather": [{"id": 211, "main": "Thunderstorm", "description": "thunderstorm", "icon": "11d"}],
        "base": "stations",
        "main": {"temp": 22.4, "feels_like": 22.9, "temp_min": 21.0, "temp_max": 23.8, "pressure": 1011, "humidity": 76},
        "visibility": 10000,
        "wind": {"speed": 4.6, "deg": 200},
        "clouds": {"all": 75},
        "dt": 1760880000,
        "sys": {"country": "US", "sunrise": 1760871000, "sunset": 1760911000},
        "timezone": -14400,
        "id": 5128581,
        "name": "New York"
    })
}

/// Forty 3-hour samples starting 2025-10-19 12:00 UTC, in New York time (UTC-4).
pub fn forecast_body() -> serde_json::Value {
    let list: Vec<_> = (0..40)
        .map(|i| {
            let (id, main) = if i % 4 == 0 { (500, "Rain") } else { (801, "Clouds") };
            serde_json::json!({
                "dt": 1760875200 + i * 10800,
                "main": {"temp": 15.0 + (i % 8) as f64, "humidity": 60 + (i % 5)},
                "weather": [{"id": id, "main": main, "description": main.to_lowercase(), "icon": "04d"}],
                "wind": {"speed": 2.5 + (i % 3) as f64}
            })
        })
        .collect();
    serde_json::json!({
        "cod": "200",
        "list": list,
        "city": {"name": "New York", "country": "US", "timezone": -14400}
    })
}
