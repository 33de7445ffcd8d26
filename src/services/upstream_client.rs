//! Shared HTTP client for every third-party call.
//!
//! Wraps `reqwest` with:
//! - configured connect and request timeouts
//! - structured logging with credentials redacted from URLs
//! - per-destination outcome metrics
//! - uniform error classification (network, timeout, non-success status, decode)
//!
//! Failed calls are never retried.

use crate::{
    config::UpstreamClientConfig, error::ApiError, services::metrics::AppMetrics,
    telemetry::redact_sensitive_data,
};
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use url::Url;

/// Longest upstream body excerpt carried into an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// How the caller wants intermediate caches to treat a GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Let intermediaries serve whatever they consider fresh.
    Default,
    /// Ask intermediaries to revalidate with the origin.
    Revalidate,
}

/// HTTP client shared by the weather, history and rate-limit gateways
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamClientConfig,
    metrics: Option<AppMetrics>,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(
        config: UpstreamClientConfig,
        metrics: Option<AppMetrics>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config,
            metrics,
        })
    }

    /// Start a request; finish it with [`UpstreamClient::send`].
    pub fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        cache: CacheMode,
    ) -> Result<T, UpstreamError> {
        let mut request = self.client.get(url);
        if cache == CacheMode::Revalidate {
            request = request.header(header::CACHE_CONTROL, "no-cache");
        }

        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Execute a request. Any non-success status is turned into [`UpstreamError::Status`].
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, UpstreamError> {
        let request = request.build()?;
        let destination = extract_destination(request.url());
        let method = request.method().to_string();
        let url = redact_sensitive_data(request.url().as_str());
        let start = Instant::now();

        let result = self.client.execute(request).await;
        let duration_ms = start.elapsed().as_millis();

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(
                    destination = %destination,
                    method = %method,
                    url = %url,
                    timeout_seconds = self.config.timeout_seconds,
                    "Upstream request timed out"
                );
                self.record(&destination, "timeout");
                return Err(UpstreamError::Timeout);
            }
            Err(e) => {
                error!(
                    destination = %destination,
                    method = %method,
                    url = %url,
                    error = %redact_sensitive_data(&e.to_string()),
                    duration_ms,
                    "Upstream request failed with network error"
                );
                self.record(&destination, "network_error");
                return Err(UpstreamError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            warn!(
                destination = %destination,
                method = %method,
                url = %url,
                status = status.as_u16(),
                duration_ms,
                error = %message,
                "Upstream request returned non-success status"
            );
            self.record(&destination, "http_error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if self.config.enable_detailed_logging {
            info!(
                destination = %destination,
                method = %method,
                url = %url,
                status = status.as_u16(),
                duration_ms,
                "Upstream request completed successfully"
            );
        }
        self.record(&destination, "success");

        Ok(response)
    }

    fn record(&self, destination: &str, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_upstream(destination, outcome);
        }
    }
}

/// Destination (host) used for metrics and log grouping
fn extract_destination(url: &Url) -> String {
    url.host_str().unwrap_or("unknown").to_string()
}

/// Pull a human-readable message out of an upstream error body.
///
/// Providers usually answer `{"message": "..."}` or `{"error": "..."}`; anything
/// else is truncated and passed along verbatim.
fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(message) = value.get(field).and_then(|m| m.as_str()) {
                return Some(message.to_string());
            }
        }
    }

    Some(body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

/// Errors that can occur when calling a third-party service
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// HTTP status reported by the upstream, when it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message for API responses
    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Network(_) => {
                "Service temporarily unavailable due to network issues".to_string()
            }
            UpstreamError::Timeout => "Service temporarily unavailable due to timeout".to_string(),
            UpstreamError::Status { message, .. } => message.clone(),
            UpstreamError::Decode(_) => "Service returned an unexpected response".to_string(),
        }
    }

    /// Annotate with the failing service for the HTTP layer.
    pub fn into_api_error(self, service: &'static str) -> ApiError {
        ApiError::upstream(service, self.status(), self.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> UpstreamClient {
        UpstreamClient::new(UpstreamClientConfig::default(), None).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = UpstreamClientConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.connect_timeout_seconds, 3);
        assert!(config.enable_detailed_logging);
    }

    #[test]
    fn test_extract_destination() {
        let url = Url::parse("https://api.example.com/path?appid=secret").unwrap();
        assert_eq!(extract_destination(&url), "api.example.com");
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"cod":401,"message":"Invalid API key"}"#).as_deref(),
            Some("Invalid API key")
        );
        assert_eq!(
            extract_error_message(r#"{"error":"ERR wrong number of arguments"}"#).as_deref(),
            Some("ERR wrong number of arguments")
        );
        assert_eq!(extract_error_message("plain failure").as_deref(), Some("plain failure"));
        assert_eq!(extract_error_message("   "), None);

        let long = "x".repeat(1000);
        assert_eq!(extract_error_message(&long).unwrap().len(), MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn test_error_user_messages() {
        assert!(UpstreamError::Timeout.user_message().contains("timeout"));
        let status_error = UpstreamError::Status {
            status: 404,
            message: "city not found".to_string(),
        };
        assert_eq!(status_error.status(), Some(404));
        assert_eq!(status_error.user_message(), "city not found");
        assert_eq!(UpstreamError::Timeout.status(), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"cod": 401, "message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data", server.uri())).unwrap();
        let err = client()
            .get_json::<serde_json::Value>(url, CacheMode::Default)
            .await
            .unwrap_err();

        match err {
            UpstreamError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_revalidate_sends_no_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header_matcher("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data", server.uri())).unwrap();
        let body: serde_json::Value = client()
            .get_json(url, CacheMode::Revalidate)
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data", server.uri())).unwrap();
        let err = client()
            .get_json::<serde_json::Value>(url, CacheMode::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }
}
