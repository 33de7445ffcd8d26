//! Search history gateway backed by a headless CMS.
//!
//! Entries live in one template of the content store, with the record fields
//! kept in the English meta block:
//!
//! - `POST   {base}/entry/{template}` creates an entry and answers `{"_id": ...}`
//! - `GET    {base}/entry/{template}` lists every entry
//! - `DELETE {base}/entry/{template}/{id}` removes one
//!
//! Requests authenticate with `Authorization: Bearer {CMS_API_KEY}`.

use crate::{
    config::HistoryConfig,
    error::ApiError,
    models::history::{HistoryOwner, NewSearchHistory, SearchHistoryRecord},
    services::upstream_client::UpstreamClient,
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

const HISTORY_SERVICE: &str = "history store";
const META_LANGUAGE: &str = "en";

#[derive(Debug, Serialize)]
struct CmsEntryRequest {
    content: Vec<serde_json::Value>,
    statuses: Vec<serde_json::Value>,
    meta: Vec<CmsMeta>,
}

#[derive(Debug, Serialize)]
struct CmsMeta {
    lng: &'static str,
    data: CmsHistoryData,
}

#[derive(Debug, Serialize, Deserialize)]
struct CmsHistoryData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    slug: String,
    locationname: String,
    lat: f64,
    lon: f64,
    temperature: f64,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    userid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CmsCreated {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct CmsEntry {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "createdAt", default)]
    created_at: Option<i64>,
    #[serde(default)]
    meta: CmsEntryMeta,
}

#[derive(Debug, Default, Deserialize)]
struct CmsEntryMeta {
    en: Option<CmsHistoryData>,
}

/// Create, list and delete search history entries.
#[derive(Clone)]
pub struct HistoryGateway {
    config: HistoryConfig,
    client: UpstreamClient,
}

impl HistoryGateway {
    pub fn new(config: HistoryConfig, client: UpstreamClient) -> Self {
        Self { config, client }
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.config.api_key.as_deref().ok_or_else(|| {
            ApiError::Configuration("CMS_API_KEY environment variable is required".into())
        })
    }

    fn entries_url(&self, id: Option<&str>) -> Result<Url, ApiError> {
        let base = self.config.base_url.as_deref().ok_or_else(|| {
            ApiError::Configuration("CMS_BASE_URL environment variable is required".into())
        })?;
        let invalid = || ApiError::Configuration(format!("invalid CMS_BASE_URL: {base}"));

        let mut url = Url::parse(base).map_err(|_| invalid())?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
            segments.pop_if_empty().push("entry").push(&self.config.template);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Store a new entry and return its id.
    pub async fn create(&self, entry: NewSearchHistory) -> Result<String, ApiError> {
        let url = self.entries_url(None)?;
        let body = CmsEntryRequest {
            content: Vec::new(),
            statuses: Vec::new(),
            meta: vec![CmsMeta {
                lng: META_LANGUAGE,
                data: CmsHistoryData {
                    title: entry.location_name.clone(),
                    slug: entry.slug(),
                    locationname: entry.location_name.clone(),
                    lat: entry.lat,
                    lon: entry.lon,
                    temperature: entry.temperature,
                    timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    userid: Some(entry.owner.as_str().to_string()),
                },
            }],
        };

        let request = self
            .client
            .request(Method::POST, url)
            .bearer_auth(self.api_key()?)
            .json(&body);
        let created: CmsCreated = self
            .client
            .send(request)
            .await
            .map_err(|e| e.into_api_error(HISTORY_SERVICE))?
            .json()
            .await
            .map_err(|e| ApiError::upstream(HISTORY_SERVICE, None, e.to_string()))?;

        info!(
            entry_id = %created.id,
            location = %entry.location_name,
            user_id = %entry.owner.as_str(),
            "Search history entry created"
        );
        Ok(created.id)
    }

    /// Every stored entry, newest first. Entries without readable record data are skipped.
    pub async fn list(&self) -> Result<Vec<SearchHistoryRecord>, ApiError> {
        let url = self.entries_url(None)?;
        let request = self
            .client
            .request(Method::GET, url)
            .bearer_auth(self.api_key()?);
        let entries: Vec<serde_json::Value> = self
            .client
            .send(request)
            .await
            .map_err(|e| e.into_api_error(HISTORY_SERVICE))?
            .json()
            .await
            .map_err(|e| ApiError::upstream(HISTORY_SERVICE, None, e.to_string()))?;

        let mut records: Vec<_> = entries.into_iter().filter_map(parse_entry).collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Remove an entry. A missing id is reported by the store, not here.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::validation("Missing entryId parameter"));
        }

        let url = self.entries_url(Some(id))?;
        let request = self
            .client
            .request(Method::DELETE, url)
            .bearer_auth(self.api_key()?);
        self.client
            .send(request)
            .await
            .map_err(|e| e.into_api_error(HISTORY_SERVICE))?;

        info!(entry_id = %id, "Search history entry deleted");
        Ok(())
    }

    /// Probe used by the health endpoint: whether the store is configured at all.
    pub fn is_configured(&self) -> bool {
        self.config.base_url.is_some() && self.config.api_key.is_some()
    }
}

fn parse_entry(value: serde_json::Value) -> Option<SearchHistoryRecord> {
    let entry: CmsEntry = match serde_json::from_value(value) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(error = %e, "Skipping unreadable history entry");
            return None;
        }
    };
    let data = entry.meta.en?;

    let timestamp = DateTime::parse_from_rfc3339(&data.timestamp)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| entry.created_at.and_then(DateTime::from_timestamp_millis))
        .unwrap_or(DateTime::UNIX_EPOCH);

    Some(SearchHistoryRecord {
        id: entry.id,
        location_name: data.locationname,
        lat: data.lat,
        lon: data.lon,
        temperature: data.temperature,
        timestamp,
        user_id: data
            .userid
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| HistoryOwner::GUEST_ID.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamClientConfig;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> HistoryGateway {
        let config = HistoryConfig {
            base_url: Some(server.uri()),
            api_key: Some("cms-key".to_string()),
            ..HistoryConfig::default()
        };
        let client = UpstreamClient::new(UpstreamClientConfig::default(), None).unwrap();
        HistoryGateway::new(config, client)
    }

    fn entry(id: &str, name: &str, timestamp: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "createdAt": 1_700_000_000_000i64,
            "meta": {"en": {
                "title": name,
                "slug": name.to_lowercase(),
                "locationname": name,
                "lat": 48.85,
                "lon": 2.35,
                "temperature": 17.5,
                "timestamp": timestamp,
                "userid": "guest"
            }}
        })
    }

    #[tokio::test]
    async fn test_create_posts_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/entry/searchhistory"))
            .and(header("authorization", "Bearer cms-key"))
            .and(body_partial_json(serde_json::json!({
                "meta": [{"lng": "en", "data": {
                    "title": "Le Mans",
                    "slug": "le-mans",
                    "locationname": "Le Mans",
                    "lat": 48.0,
                    "lon": 0.2,
                    "temperature": 12.0,
                    "userid": "guest"
                }}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "entry-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let new_entry =
            NewSearchHistory::new(Some("Le Mans"), Some(48.0), Some(0.2), Some(12.0), None)
                .unwrap();
        let id = gateway(&server).create(new_entry).await.unwrap();
        assert_eq!(id, "entry-1");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entry/searchhistory"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                entry("older", "Paris", "2026-10-01T10:00:00.000Z"),
                {"_id": "draft", "meta": {}},
                entry("newer", "Lyon", "2026-10-18T10:00:00.000Z"),
                entry("legacy", "Nice", "not a timestamp"),
            ])))
            .mount(&server)
            .await;

        let records = gateway(&server).list().await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older", "legacy"]);
        assert_eq!(records[2].timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(records[0].location_name, "Lyon");
    }

    #[tokio::test]
    async fn test_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/entry/searchhistory/entry-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server).delete("entry-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_id_surfaces_store_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "Entry does not exist"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).delete("missing").await.unwrap_err();
        match err {
            ApiError::Upstream {
                status, message, ..
            } => {
                assert_eq!(status, Some(404));
                assert_eq!(message, "Entry does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let server = MockServer::start().await;
        let err = gateway(&server).delete("  ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_store() {
        let client = UpstreamClient::new(UpstreamClientConfig::default(), None).unwrap();
        let gateway = HistoryGateway::new(HistoryConfig::default(), client);
        assert!(!gateway.is_configured());
        assert!(matches!(
            gateway.list().await,
            Err(ApiError::Configuration(_))
        ));
    }
}
