//! HTTP utility functions for extracting request information.

use actix_web::HttpRequest;

/// Client key used for rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    /// First address of `X-Forwarded-For`
    Forwarded(String),
    /// No forwarded address; every such caller shares one bucket
    Loopback,
}

impl ClientIdentity {
    pub const LOOPBACK: &'static str = "127.0.0.1";

    pub fn from_request(req: &HttpRequest) -> Self {
        Self::from_forwarded_for(
            req.headers()
                .get("X-Forwarded-For")
                .and_then(|h| h.to_str().ok()),
        )
    }

    /// X-Forwarded-For can contain multiple addresses; the first is the client.
    pub fn from_forwarded_for(header: Option<&str>) -> Self {
        header
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map_or(Self::Loopback, |ip| Self::Forwarded(ip.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Forwarded(ip) => ip,
            Self::Loopback => Self::LOOPBACK,
        }
    }
}

/// Extract user agent from request headers
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
