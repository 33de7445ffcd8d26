//! Rate limiting configuration.
//!
//! The backend is an explicit switch (`RATE_LIMIT_BACKEND`), never inferred from
//! which credentials happen to be present:
//!
//! - `upstash` (default): hosted sliding window. Missing URL or token is a
//!   startup error, so a misconfigured deployment fails closed.
//! - `memory`: single-process sliding window.
//! - `allow-all`: development stub that admits everything; refused in production.

use super::{ConfigError, non_empty_var, parse_var};

pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW_SECONDS: u64 = 10;
pub const DEFAULT_KEY_PREFIX: &str = "weatherscope-rate-limit";

/// Which store keeps the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitBackend {
    Upstash { url: String, token: String },
    InMemory,
    AllowAll,
}

/// Configuration for rate limiting
///
/// `Default` uses the in-memory backend because the hosted store has no
/// credential-free default. Deployments go through [`RateLimitConfig::from_env`],
/// which selects `upstash` unless `RATE_LIMIT_BACKEND` says otherwise.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
    pub key_prefix: String,
    pub backend: RateLimitBackend,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            backend: RateLimitBackend::InMemory,
        }
    }
}

impl RateLimitConfig {
    /// Default quota and window with the given backend.
    pub fn with_backend(backend: RateLimitBackend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_requests = parse_var("RATE_LIMIT_REQUESTS", DEFAULT_MAX_REQUESTS)?;
        let window_seconds = parse_var("RATE_LIMIT_WINDOW_SECONDS", DEFAULT_WINDOW_SECONDS)?;
        if max_requests == 0 || window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                var: "RATE_LIMIT_REQUESTS/RATE_LIMIT_WINDOW_SECONDS",
                value: format!("{max_requests}/{window_seconds}"),
            });
        }

        let backend = match non_empty_var("RATE_LIMIT_BACKEND")
            .unwrap_or_else(|| "upstash".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "upstash" => RateLimitBackend::Upstash {
                url: non_empty_var("UPSTASH_REDIS_REST_URL")
                    .ok_or(ConfigError::MissingVar("UPSTASH_REDIS_REST_URL"))?,
                token: non_empty_var("UPSTASH_REDIS_REST_TOKEN")
                    .ok_or(ConfigError::MissingVar("UPSTASH_REDIS_REST_TOKEN"))?,
            },
            "memory" => RateLimitBackend::InMemory,
            "allow-all" => RateLimitBackend::AllowAll,
            other => {
                return Err(ConfigError::InvalidValue {
                    var: "RATE_LIMIT_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            max_requests,
            window_seconds,
            key_prefix: non_empty_var("RATE_LIMIT_PREFIX")
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
            backend,
        })
    }
}
