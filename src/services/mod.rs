//! Business logic and gateways to third-party services.
//!
//! Pure logic (condition classification, forecast aggregation) sits beside the
//! gateways that call the weather provider, the history store and the
//! rate-limit store through the shared [`UpstreamClient`].

pub mod condition;
pub mod forecast;
pub mod history;
pub mod metrics;
pub mod rate_limit;
pub mod upstream_client;
pub mod weather;

pub use condition::ConditionCategory;
pub use forecast::aggregate_daily;
pub use history::HistoryGateway;
pub use metrics::AppMetrics;
pub use rate_limit::{RateLimitDecision, RateLimiter, enforce_rate_limit};
pub use upstream_client::{UpstreamClient, UpstreamError};
pub use weather::{Freshness, WeatherGateway};
