//! WinGo draw history feed adapter.
//!
//! The endpoint answers `{"data": {"list": [...]}}` with the newest draw first.
//! Entries are converted one by one; a malformed entry is dropped and counted,
//! never failing the whole page.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::domain::DrawRecord;
use crate::error::{Result, WingoError};

/// One page of draws, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedBatch {
    pub records: Vec<DrawRecord>,
    /// Entries dropped as malformed
    pub rejected: usize,
}

/// Source of recent draws
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch at most `limit` of the newest draws
    async fn fetch_latest(&self, limit: usize) -> Result<FeedBatch>;
}

#[derive(Clone)]
pub struct WingoFeedClient {
    http: Client,
    url: String,
    cache_bust: bool,
}

impl WingoFeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| WingoError::Internal(format!("failed to build feed HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.url.clone(),
            cache_bust: config.cache_bust,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedClient for WingoFeedClient {
    async fn fetch_latest(&self, limit: usize) -> Result<FeedBatch> {
        let mut req = self.http.get(&self.url);
        if self.cache_bust {
            req = req.query(&[("ts", Utc::now().timestamp_millis().to_string())]);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(WingoError::Fetch(format!(
                "feed returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let batch = parse_history_page(&text, limit)?;
        debug!(
            url = %self.url,
            records = batch.records.len(),
            rejected = batch.rejected,
            "fetched draw page"
        );
        Ok(batch)
    }
}

/// Decode a history page body into at most `limit` draws
pub fn parse_history_page(body: &str, limit: usize) -> Result<FeedBatch> {
    let mut root: Value = serde_json::from_str(body)?;

    let list = match root.pointer_mut("/data/list").map(Value::take) {
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(WingoError::Fetch(format!(
                "data.list is not an array: {}",
                other
            )))
        }
        None => return Err(WingoError::Fetch("response has no data.list".to_string())),
    };

    let mut batch = FeedBatch::default();
    for entry in list.into_iter().take(limit) {
        match DrawRecord::try_from(entry) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                batch.rejected += 1;
                warn!(error = %e, "dropping malformed feed entry");
            }
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "data": {
            "list": [
                {"issueNumber": "20240101100010003", "number": "8", "color": "red"},
                {"issueNumber": "20240101100010002", "number": 0, "color": "red,violet"},
                {"issueNumber": "20240101100010001", "number": "?", "color": "green"},
                {"issueNumber": "20240101100010000", "number": "5", "color": "green,violet"}
            ]
        },
        "code": 0
    }"#;

    #[test]
    fn test_parse_page_skips_malformed() {
        let batch = parse_history_page(PAGE, 10).unwrap();
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.rejected, 1);
        assert_eq!(batch.records[0].issue.as_str(), "20240101100010003");
        assert_eq!(batch.records[1].color, "red,violet");
    }

    #[test]
    fn test_parse_page_honours_limit() {
        let batch = parse_history_page(PAGE, 2).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.rejected, 0);
    }

    #[test]
    fn test_parse_page_rejects_bad_envelope() {
        assert!(matches!(
            parse_history_page(r#"{"data": {}}"#, 10),
            Err(WingoError::Fetch(_))
        ));
        assert!(matches!(
            parse_history_page(r#"{"data": {"list": 3}}"#, 10),
            Err(WingoError::Fetch(_))
        ));
        assert!(matches!(
            parse_history_page("<html>", 10),
            Err(WingoError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_client_builds_from_defaults() {
        let client = WingoFeedClient::new(&FeedConfig::default()).unwrap();
        assert_eq!(client.url(), crate::config::DEFAULT_FEED_URL);
    }
}
