//! Configuration structures and loading utilities.
//!
//! Every concern has its own struct with a `from_env()` loader and sensible
//! defaults. [`AppConfig`] gathers them so `main` reads the environment once and
//! passes explicit values to the services it constructs.

pub mod history;
pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod upstream_client;
pub mod weather;

pub use history::*;
pub use logging::*;
pub use rate_limit::*;
pub use server::*;
pub use upstream_client::*;
pub use weather::*;

use std::env;

/// Errors raised while loading configuration or wiring services at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    #[error("{var} has an invalid value: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("{0} must not be used in production")]
    NotAllowedInProduction(&'static str),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("failed to create metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub weather: WeatherConfig,
    pub history: HistoryConfig,
    pub rate_limit: RateLimitConfig,
    pub upstream_client: UpstreamClientConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env(),
            weather: WeatherConfig::from_env(),
            history: HistoryConfig::from_env(),
            rate_limit: RateLimitConfig::from_env()?,
            upstream_client: UpstreamClientConfig::from_env(),
        })
    }
}

/// Read a variable, treating blank values as absent.
pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric variable, falling back to `default` when unset.
pub(crate) fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: name,
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Parse a boolean flag the way the rest of the config does: "true" (any case) enables it.
pub(crate) fn flag_var(name: &str, default: bool) -> bool {
    non_empty_var(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
