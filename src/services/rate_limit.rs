//! Rate limiting adapter.
//!
//! [`RateLimiter`] gives handlers one `limit(identifier)` contract over three
//! interchangeable backends:
//!
//! - [`UpstashLimiter`]: sliding window evaluated atomically in a hosted Redis
//!   through its REST API. Counters are shared by every instance of the service.
//! - [`SlidingWindowLimiter`]: the same policy kept in process memory.
//! - [`AllowAllLimiter`]: admits everything with a fixed decision. Refused in
//!   production at construction time.
//!
//! The limiter is built once from [`RateLimitConfig`] and injected into the app
//! as `web::Data<RateLimiter>`.

use crate::{
    config::{ConfigError, DeploymentEnvironment, RateLimitBackend, RateLimitConfig},
    error::ApiError,
    middleware::RequestId,
    services::{metrics::AppMetrics, upstream_client::UpstreamClient},
    utils::http::ClientIdentity,
};
use actix_web::{HttpRequest, web};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, PoisonError},
};
use url::Url;

const UPSTASH_SERVICE: &str = "rate limit store";

/// Fixed answer of the development stub.
const ALLOW_ALL_LIMIT: u32 = 10;
const ALLOW_ALL_REMAINING: u32 = 9;

/// Sliding-window check run inside Redis so concurrent callers see one counter.
///
/// KEYS: current bucket, previous bucket. ARGV: limit, now (ms), window (ms), cost.
/// Returns the remaining quota after this call, or -1 when the call is rejected.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local current = tonumber(redis.call("GET", KEYS[1]) or "0")
local previous = tonumber(redis.call("GET", KEYS[2]) or "0")
local limit = tonumber(ARGV[1])
local now = tonumber(ARGV[2])
local window = tonumber(ARGV[3])
local cost = tonumber(ARGV[4])

local elapsed = (now % window) / window
local carried = math.floor((1 - elapsed) * previous)
if current + carried >= limit then
  return -1
end

local updated = redis.call("INCRBY", KEYS[1], cost)
if updated == cost then
  redis.call("PEXPIRE", KEYS[1], window * 2 + 1000)
end
return limit - (updated + carried)
"#;

/// Outcome of one `limit` call.
///
/// `remaining` and `reset_at` come from the backend; callers only read them.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// `X-RateLimit-*` headers; the reset is reported as epoch milliseconds.
    pub fn header_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("X-RateLimit-Limit", self.limit.to_string()),
            ("X-RateLimit-Remaining", self.remaining.to_string()),
            ("X-RateLimit-Reset", self.reset_at.timestamp_millis().to_string()),
        ]
    }
}

/// Injected rate limiter; see the module docs for the backends.
pub enum RateLimiter {
    Upstash(UpstashLimiter),
    InMemory(SlidingWindowLimiter),
    AllowAll(AllowAllLimiter),
}

impl RateLimiter {
    /// Build the configured backend.
    ///
    /// The always-allow stub is a configuration error in production.
    pub fn from_config(
        config: &RateLimitConfig,
        environment: DeploymentEnvironment,
        client: UpstreamClient,
    ) -> Result<Self, ConfigError> {
        let limiter = match &config.backend {
            RateLimitBackend::Upstash { url, token } => {
                let url = Url::parse(url).map_err(|_| ConfigError::InvalidValue {
                    var: "UPSTASH_REDIS_REST_URL",
                    value: url.clone(),
                })?;
                Self::Upstash(UpstashLimiter {
                    client,
                    url,
                    token: token.clone(),
                    key_prefix: config.key_prefix.clone(),
                    max_requests: config.max_requests,
                    window: window_duration(config.window_seconds),
                })
            }
            RateLimitBackend::InMemory => {
                if environment.is_production() {
                    tracing::warn!(
                        "Using in-memory rate limiter in production; quotas are per process"
                    );
                }
                Self::InMemory(SlidingWindowLimiter::new(
                    config.max_requests,
                    window_duration(config.window_seconds),
                ))
            }
            RateLimitBackend::AllowAll => {
                if environment.is_production() {
                    return Err(ConfigError::NotAllowedInProduction(
                        "RATE_LIMIT_BACKEND=allow-all",
                    ));
                }
                tracing::warn!("Using always-allow rate limiter - for development only");
                Self::AllowAll(AllowAllLimiter)
            }
        };

        tracing::info!(
            backend = limiter.backend_name(),
            max_requests = config.max_requests,
            window_seconds = config.window_seconds,
            "Rate limiter configured"
        );
        Ok(limiter)
    }

    /// Consume one unit of `identifier`'s quota.
    pub async fn limit(&self, identifier: &str) -> Result<RateLimitDecision, ApiError> {
        match self {
            Self::Upstash(limiter) => limiter.limit(identifier).await,
            Self::InMemory(limiter) => Ok(limiter.check_at(identifier, Utc::now())),
            Self::AllowAll(limiter) => Ok(limiter.decision(Utc::now())),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Upstash(_) => "upstash",
            Self::InMemory(_) => "memory",
            Self::AllowAll(_) => "allow-all",
        }
    }
}

fn window_duration(seconds: u64) -> Duration {
    Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX / 1000))
}

/// Sliding window kept in an Upstash Redis database, called over REST.
pub struct UpstashLimiter {
    client: UpstreamClient,
    url: Url,
    token: String,
    key_prefix: String,
    max_requests: u32,
    window: Duration,
}

#[derive(Debug, Deserialize)]
struct UpstashReply {
    result: Option<i64>,
    error: Option<String>,
}

impl UpstashLimiter {
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision, ApiError> {
        let window_ms = self.window.num_milliseconds().max(1);
        let now_ms = Utc::now().timestamp_millis();
        let bucket = now_ms / window_ms;

        let current_key = format!("{}:{}:{}", self.key_prefix, identifier, bucket);
        let previous_key = format!("{}:{}:{}", self.key_prefix, identifier, bucket - 1);
        let command = serde_json::json!([
            "EVAL",
            SLIDING_WINDOW_SCRIPT,
            "2",
            current_key,
            previous_key,
            self.max_requests.to_string(),
            now_ms.to_string(),
            window_ms.to_string(),
            "1",
        ]);

        let request = self
            .client
            .request(reqwest::Method::POST, self.url.clone())
            .bearer_auth(&self.token)
            .json(&command);

        let reply: UpstashReply = self
            .client
            .send(request)
            .await
            .map_err(|e| e.into_api_error(UPSTASH_SERVICE))?
            .json()
            .await
            .map_err(|e| ApiError::upstream(UPSTASH_SERVICE, None, e.to_string()))?;

        if let Some(error) = reply.error {
            return Err(ApiError::upstream(UPSTASH_SERVICE, None, error));
        }
        let remaining = reply.result.ok_or_else(|| {
            ApiError::upstream(UPSTASH_SERVICE, None, "reply carried no result")
        })?;

        let reset_at = DateTime::from_timestamp_millis((bucket + 1) * window_ms)
            .unwrap_or_else(|| Utc::now() + self.window);

        Ok(RateLimitDecision {
            allowed: remaining >= 0,
            limit: self.max_requests,
            remaining: u32::try_from(remaining.max(0)).unwrap_or(u32::MAX),
            reset_at,
        })
    }
}

/// In-process sliding window log.
///
/// Every admitted call is timestamped; a key is over quota while it has
/// `max_requests` timestamps younger than the window.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    hits: Arc<Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Evaluate a call for `key` made at `now`.
    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);

        // Forget calls that left the window, and keys with nothing left
        hits.retain(|_, log| {
            while log.front().is_some_and(|t| now - *t >= self.window) {
                log.pop_front();
            }
            !log.is_empty()
        });

        let log = hits.entry(key.to_string()).or_default();
        let max = self.max_requests as usize;

        if log.len() >= max {
            let reset_at = log.front().map_or(now + self.window, |t| *t + self.window);
            return RateLimitDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_at,
            };
        }

        log.push_back(now);
        let reset_at = log.front().map_or(now + self.window, |t| *t + self.window);
        RateLimitDecision {
            allowed: true,
            limit: self.max_requests,
            remaining: (max - log.len()) as u32,
            reset_at,
        }
    }
}

/// Development stand-in that never rejects.
pub struct AllowAllLimiter;

impl AllowAllLimiter {
    fn decision(&self, now: DateTime<Utc>) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            limit: ALLOW_ALL_LIMIT,
            remaining: ALLOW_ALL_REMAINING,
            reset_at: now + Duration::seconds(10),
        }
    }
}

/// Apply the limiter to an incoming request.
///
/// The client is identified by its first forwarded address. A rejected call
/// comes back as [`ApiError::RateLimited`], which renders the 429 with retry
/// headers.
pub async fn enforce_rate_limit(
    req: &HttpRequest,
    limiter: &RateLimiter,
) -> Result<RateLimitDecision, ApiError> {
    let client = ClientIdentity::from_request(req);
    let decision = limiter.limit(client.as_str()).await?;

    if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
        metrics.record_rate_limit(decision.allowed);
    }

    if !decision.allowed {
        tracing::warn!(
            request_id = ?RequestId::of(req),
            client = %client.as_str(),
            path = %req.path(),
            limit = decision.limit,
            reset_at = %decision.reset_at,
            "Rate limit exceeded"
        );
        return Err(ApiError::RateLimited(decision));
    }

    Ok(decision)
}
