//! Configuration for the outbound HTTP client
//!
//! Timeouts are the only protection outbound calls get: there are no retries,
//! a failed call surfaces to the caller immediately.

use super::{flag_var, non_empty_var};

/// Configuration for the shared upstream HTTP client
#[derive(Debug, Clone)]
pub struct UpstreamClientConfig {
    /// Whole-request timeout (in seconds)
    pub timeout_seconds: u64,

    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,

    /// Log every outbound call, not only failures
    pub enable_detailed_logging: bool,
}

impl Default for UpstreamClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            connect_timeout_seconds: 3,
            enable_detailed_logging: true,
        }
    }
}

impl UpstreamClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout_seconds = non_empty_var("UPSTREAM_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_seconds);

        let connect_timeout_seconds = non_empty_var("UPSTREAM_CONNECT_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_timeout_seconds);

        Self {
            timeout_seconds,
            connect_timeout_seconds,
            enable_detailed_logging: flag_var(
                "UPSTREAM_DETAILED_LOGGING",
                defaults.enable_detailed_logging,
            ),
        }
    }
}
