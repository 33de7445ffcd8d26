//! WeatherScope API - weather lookup service built with Actix Web and Paperclip
//!
//! Callers search for a location, fetch current conditions with a five-day
//! daily forecast, and keep a history of past searches. Weather data comes from
//! an OpenWeatherMap-compatible provider, history lives in a headless CMS, and
//! rate-limit counters live in Upstash Redis (or in process memory).
//!
//! ## Architecture
//!
//! - `config/` - per-concern configuration loaded from the environment
//! - `models/` - provider payloads, derived shapes and request/response models
//! - `services/` - forecast aggregation, condition classification, rate limiting
//!   and the gateways to third-party services
//! - `handlers/` - HTTP handlers and the app factory
//! - `middleware/` - request IDs and request metrics
//! - `utils/` - request inspection helpers
//! - `telemetry` - log subscriber setup and secret redaction
//!
//! ## Quick Start
//!
//! ```no_run
//! use weatherscope_api::{AppConfig, AppServices, create_app};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = AppConfig::from_env().expect("valid configuration");
//!     let services = AppServices::from_config(&config).expect("services");
//!     actix_web::HttpServer::new(move || create_app(services.clone()))
//!         .bind(config.server.bind_address.as_str())?
//!         .run()
//!         .await
//! }
//! ```

pub mod build_info;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use config::{AppConfig, ConfigError, DeploymentEnvironment, RateLimitBackend, RateLimitConfig};
pub use error::ApiError;
pub use handlers::{AppServices, create_app, create_openapi_spec};
pub use middleware::{MetricsMiddleware, RequestIdMiddleware};
pub use models::{
    Coordinates, DailyForecastSummary, LocationMatch, RawForecastSample, SearchHistoryRecord,
    WeatherCondition, WeatherPayload,
};
pub use services::{
    AppMetrics, ConditionCategory, Freshness, HistoryGateway, RateLimitDecision, RateLimiter,
    UpstreamClient, WeatherGateway, aggregate_daily,
};
