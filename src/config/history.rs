//! Content-store configuration for search history.

use super::non_empty_var;

pub const DEFAULT_HISTORY_TEMPLATE: &str = "searchhistory";

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Base URL of the content store's entry API.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Template (collection) the history entries live in.
    pub template: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            template: DEFAULT_HISTORY_TEMPLATE.to_string(),
        }
    }
}

impl HistoryConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            base_url: non_empty_var("CMS_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            api_key: non_empty_var("CMS_API_KEY"),
            template: non_empty_var("CMS_HISTORY_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_HISTORY_TEMPLATE.to_string()),
        }
    }
}
