//! Log subscriber setup and redaction of secrets before they reach logs.

use crate::config::{LogFormat, LoggingConfig};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init(),
    };

    if result.is_ok() {
        info!(
            service_name = %config.service_name,
            version = env!("CARGO_PKG_VERSION"),
            format = ?config.format,
            "Logging initialized"
        );
    }
}

/// (pattern, replacement) pairs applied in order
static SENSITIVE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // Provider API key in query strings
        (r"(?i)(appid=)[^&\s]+", "${1}[REDACTED]"),
        (r"(?i)(api[_-]?key=)[^&\s]+", "${1}[REDACTED]"),
        (r"(?i)(bearer\s+)[A-Za-z0-9._~+/=-]+", "${1}[REDACTED]"),
        (
            r#"(?i)"(token|api[_-]?key|secret|authorization|password)":\s*"[^"]*""#,
            r#""$1": "[REDACTED]""#,
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Redact credentials from URLs, headers and JSON bodies destined for logs.
pub fn redact_sensitive_data(input: &str) -> String {
    SENSITIVE_PATTERNS
        .iter()
        .fold(input.to_string(), |text, (re, replacement)| {
            re.replace_all(&text, *replacement).into_owned()
        })
}
