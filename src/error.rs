//! HTTP-facing error taxonomy.
//!
//! Gateways return [`ApiError`] and handlers let actix render it, so this is the
//! one place where failures turn into status codes and JSON bodies.

use crate::{config::ConfigError, services::rate_limit::RateLimitDecision};
use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Standard error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

/// Body returned alongside a 429.
#[derive(Debug, Serialize)]
pub struct RateLimitExceededResponse {
    pub error: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing caller input. Never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A third-party service failed or answered with a non-success status.
    #[error("Upstream {service} failed: {message}")]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Rate limit exceeded")]
    RateLimited(RateLimitDecision),

    /// Missing credentials or a misconfigured backend.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn upstream(service: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::Upstream {
            service,
            status,
            message: message.into(),
        }
    }

    /// Seconds a rejected caller should wait, never less than one.
    fn retry_after_seconds(decision: &RateLimitDecision) -> i64 {
        Self::retry_after_seconds_at(decision, Utc::now())
    }

    /// Rounds up so the hint never lands before `reset_at`.
    fn retry_after_seconds_at(decision: &RateLimitDecision, now: DateTime<Utc>) -> i64 {
        let millis = (decision.reset_at - now).num_milliseconds();
        ((millis + 999) / 1000).max(1)
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Configuration(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        match self {
            ApiError::Validation(message) => builder.json(ErrorResponse {
                error: message.clone(),
                details: None,
                upstream_status: None,
            }),
            ApiError::Upstream {
                service,
                status,
                message,
            } => {
                tracing::error!(
                    service = %service,
                    upstream_status = ?status,
                    error = %message,
                    "Upstream request failed"
                );
                builder.json(ErrorResponse {
                    error: format!("Failed to reach {service}"),
                    details: Some(message.clone()),
                    upstream_status: *status,
                })
            }
            ApiError::RateLimited(decision) => {
                builder.insert_header((
                    header::RETRY_AFTER,
                    Self::retry_after_seconds(decision).to_string(),
                ));
                for (name, value) in decision.header_pairs() {
                    builder.insert_header((name, value));
                }
                builder.json(RateLimitExceededResponse {
                    error: "Rate limit exceeded".to_string(),
                    limit: decision.limit,
                    remaining: decision.remaining,
                    reset: decision.reset_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                })
            }
            ApiError::Configuration(message) => {
                tracing::error!(error = %message, "Service misconfigured");
                builder.json(ErrorResponse {
                    error: "Service is not configured correctly".to_string(),
                    details: Some(message.clone()),
                    upstream_status: None,
                })
            }
        }
    }
}
