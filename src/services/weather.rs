//! Weather provider gateway.
//!
//! Fetches current conditions and the 5-day/3-hour forecast concurrently, then
//! rolls the forecast up into daily summaries. Also fronts the provider's
//! geocoding API for location search.

use crate::{
    config::WeatherConfig,
    error::ApiError,
    models::{
        location::{GeoLocation, LocationMatch},
        weather::{Coordinates, CurrentWeather, ForecastItem, ForecastResponse, WeatherPayload},
    },
    services::{
        forecast::{aggregate_daily, offset_from_seconds},
        upstream_client::{CacheMode, UpstreamClient},
    },
};
use tracing::debug;
use url::Url;

const WEATHER_SERVICE: &str = "weather provider";
const GEOCODING_SERVICE: &str = "geocoding provider";

pub const DEFAULT_LOCATION_LIMIT: u8 = 5;
/// Largest result count the geocoding API accepts
pub const MAX_LOCATION_LIMIT: u8 = 5;

/// Whether a caller accepts cached weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Intermediaries may serve the response for up to an hour.
    #[default]
    Cached,
    /// Revalidate upstream and forbid storing the response.
    ForceRefresh,
}

impl Freshness {
    /// `refresh=true` or `refresh=1` forces a refresh.
    pub fn from_refresh_flag(refresh: Option<&str>) -> Self {
        match refresh.map(str::trim) {
            Some(flag) if flag == "1" || flag.eq_ignore_ascii_case("true") => Self::ForceRefresh,
            _ => Self::Cached,
        }
    }

    fn cache_mode(self) -> CacheMode {
        match self {
            Self::Cached => CacheMode::Default,
            Self::ForceRefresh => CacheMode::Revalidate,
        }
    }

    /// `Cache-Control` value for the response sent back to the caller
    pub fn response_cache_control(self) -> &'static str {
        match self {
            Self::Cached => "public, max-age=3600",
            Self::ForceRefresh => "no-store",
        }
    }
}

/// Gateway to an OpenWeatherMap-compatible provider.
#[derive(Clone)]
pub struct WeatherGateway {
    config: WeatherConfig,
    client: UpstreamClient,
}

impl WeatherGateway {
    pub fn new(config: WeatherConfig, client: UpstreamClient) -> Self {
        Self { config, client }
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.config.api_key.as_deref().ok_or_else(|| {
            ApiError::Configuration("OPENWEATHER_API_KEY environment variable is required".into())
        })
    }

    /// Current conditions plus daily forecast for `coordinates`.
    ///
    /// Either upstream call failing fails the whole lookup.
    pub async fn fetch_weather(
        &self,
        coordinates: Coordinates,
        freshness: Freshness,
    ) -> Result<WeatherPayload, ApiError> {
        let params = [
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_key()?.to_string()),
        ];
        let current_url = endpoint(&self.config.base_url, "weather", &params)?;
        let forecast_url = endpoint(&self.config.base_url, "forecast", &params)?;
        let cache = freshness.cache_mode();

        let (current, forecast) = tokio::try_join!(
            self.client.get_json::<CurrentWeather>(current_url, cache),
            self.client.get_json::<ForecastResponse>(forecast_url, cache),
        )
        .map_err(|e| e.into_api_error(WEATHER_SERVICE))?;

        let samples: Vec<_> = forecast
            .list
            .iter()
            .filter_map(ForecastItem::to_sample)
            .collect();
        let daily = aggregate_daily(&samples, offset_from_seconds(forecast.city.timezone));

        debug!(
            lat = coordinates.lat,
            lon = coordinates.lon,
            samples = samples.len(),
            days = daily.len(),
            city = %forecast.city.name,
            "Weather fetched"
        );

        Ok(WeatherPayload {
            current: current.classify(),
            forecast: daily,
        })
    }

    /// Locations matching `query`, ranked by the provider.
    pub async fn search_locations(
        &self,
        query: &str,
        limit: u8,
    ) -> Result<Vec<LocationMatch>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::validation("Location query is required"));
        }
        if !(1..=MAX_LOCATION_LIMIT).contains(&limit) {
            return Err(ApiError::validation(format!(
                "limit must be between 1 and {MAX_LOCATION_LIMIT}"
            )));
        }

        let url = endpoint(
            &self.config.geocoding_base_url,
            "direct",
            &[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("appid", self.api_key()?.to_string()),
            ],
        )?;

        let locations: Vec<GeoLocation> = self
            .client
            .get_json(url, CacheMode::Default)
            .await
            .map_err(|e| e.into_api_error(GEOCODING_SERVICE))?;

        Ok(locations.into_iter().map(LocationMatch::from).collect())
    }
}

fn endpoint(base: &str, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
    let mut url = Url::parse(&format!("{}/{}", base.trim_end_matches('/'), path))
        .map_err(|e| ApiError::Configuration(format!("invalid provider URL {base}: {e}")))?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::UpstreamClientConfig, services::condition::ConditionCategory};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer, api_key: Option<&str>) -> WeatherGateway {
        let config = WeatherConfig {
            api_key: api_key.map(str::to_string),
            base_url: server.uri(),
            geocoding_base_url: server.uri(),
        };
        let client = UpstreamClient::new(UpstreamClientConfig::default(), None).unwrap();
        WeatherGateway::new(config, client)
    }

    fn coordinates() -> Coordinates {
        Coordinates::new(Some(51.5), Some(-0.12)).unwrap()
    }

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lat": 51.5, "lon": -0.12},
            "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}],
            "main": {"temp": 14.3, "feels_like": 13.8, "temp_min": 13.0, "temp_max": 15.2, "pressure": 1008, "humidity": 88},
            "wind": {"speed": 6.2, "deg": 220},
            "dt": 1760860800,
            "timezone": 3600,
            "name": "London"
        })
    }

    fn forecast_body() -> serde_json::Value {
        // 2025-10-19 09:00 UTC onwards, every 3 hours
        let list: Vec<_> = (0..16)
            .map(|i| {
                let (id, main) = if i % 3 == 0 { (800, "Clear") } else { (803, "Clouds") };
                serde_json::json!({
                    "dt": 1760864400 + i * 10800,
                    "main": {"temp": 10.0 + i as f64, "humidity": 70},
                    "weather": [{"id": id, "main": main, "description": main.to_lowercase(), "icon": "01d"}],
                    "wind": {"speed": 3.0}
                })
            })
            .collect();
        serde_json::json!({"list": list, "city": {"name": "London", "country": "GB", "timezone": 3600}})
    }

    #[tokio::test]
    async fn test_fetch_weather_merges_current_and_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("lat", "51.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = gateway(&server, Some("test-key"))
            .fetch_weather(coordinates(), Freshness::Cached)
            .await
            .unwrap();

        assert_eq!(payload.current.name, "London");
        assert_eq!(payload.current.category, Some(ConditionCategory::Rain));
        assert!(!payload.forecast.is_empty());
        assert!(payload.forecast.len() <= 5);
        for day in &payload.forecast {
            assert!(day.temp_min <= day.temp_avg && day.temp_avg <= day.temp_max);
        }
        assert_eq!(payload.forecast[0].category, ConditionCategory::Cloud);
    }

    #[tokio::test]
    async fn test_one_failed_call_fails_the_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"cod": 401, "message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server, Some("bad-key"))
            .fetch_weather(coordinates(), Freshness::Cached)
            .await
            .unwrap_err();

        match err {
            ApiError::Upstream {
                status, message, ..
            } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_force_refresh_revalidates_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server, Some("test-key"))
            .fetch_weather(coordinates(), Freshness::ForceRefresh)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let server = MockServer::start().await;
        let err = gateway(&server, None)
            .fetch_weather(coordinates(), Freshness::Cached)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_locations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/direct"))
            .and(query_param("q", "Springfield"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Springfield", "lat": 39.8, "lon": -89.64, "country": "US", "state": "Illinois"},
                {"name": "Springfield", "lat": 37.2, "lon": -93.29, "country": "US", "state": "Missouri"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let matches = gateway(&server, Some("test-key"))
            .search_locations(" Springfield ", 2)
            .await
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].display_name, "Springfield, Illinois, US");
        assert_eq!(matches[1].state.as_deref(), Some("Missouri"));
    }

    #[tokio::test]
    async fn test_search_locations_validation() {
        let server = MockServer::start().await;
        let gateway = gateway(&server, Some("test-key"));

        assert!(matches!(
            gateway.search_locations("  ", 5).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            gateway.search_locations("Paris", 0).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            gateway.search_locations("Paris", 9).await,
            Err(ApiError::Validation(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_freshness_flag() {
        assert_eq!(Freshness::from_refresh_flag(None), Freshness::Cached);
        assert_eq!(Freshness::from_refresh_flag(Some("true")), Freshness::ForceRefresh);
        assert_eq!(Freshness::from_refresh_flag(Some("1")), Freshness::ForceRefresh);
        assert_eq!(Freshness::from_refresh_flag(Some("no")), Freshness::Cached);
        assert_eq!(Freshness::Cached.response_cache_control(), "public, max-age=3600");
        assert_eq!(Freshness::ForceRefresh.response_cache_control(), "no-store");
    }
}
