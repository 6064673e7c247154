//! Jackett source adapter.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::JackettConfig;
use crate::show::WantedEpisode;

use super::magnet::{hash_from_magnet, name_from_magnet};
use super::{AdapterError, RawHit, SearchStrings, SourceAdapter};

/// Newznab TV category.
const TV_CATEGORY: u32 = 5000;

/// Jackett source adapter. Queries one Jackett indexer (or the aggregate
/// "all" indexer) restricted to the TV category.
pub struct JackettAdapter {
    client: Client,
    config: JackettConfig,
}

impl JackettAdapter {
    /// Create a new JackettAdapter with the given configuration.
    pub fn new(config: JackettConfig) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| AdapterError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the Jackett API URL for one search string.
    fn build_search_url(&self, query: &str) -> String {
        format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}&Category[]={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.indexer),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(query),
            TV_CATEGORY
        )
    }

    async fn search_one(&self, query: &str) -> Result<Vec<RawHit>, AdapterError> {
        let url = self.build_search_url(query);
        debug!(indexer = %self.config.indexer, query = query, "Searching Jackett");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout
            } else if e.is_connect() {
                AdapterError::ConnectionFailed(e.to_string())
            } else {
                AdapterError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AdapterError::AuthFailed(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::ApiError(format!("Failed to parse response: {}", e)))?;

        debug!(
            indexer = %self.config.indexer,
            results = jackett_response.Results.len(),
            "Jackett search complete"
        );

        Ok(jackett_response
            .Results
            .into_iter()
            .filter_map(|r| into_raw_hit(r, self.name()))
            .collect())
    }
}

/// Convert one Jackett result. Results without a link are useless; a
/// missing title falls back to the magnet's display name.
fn into_raw_hit(r: JackettResult, source: &str) -> Option<RawHit> {
    let link = r.MagnetUri.or(r.Link).filter(|l| !l.is_empty())?;
    let title = match r.Title.trim() {
        "" => name_from_magnet(&link)?,
        title => title.to_string(),
    };

    let hash = r
        .InfoHash
        .map(|h| h.to_uppercase())
        .or_else(|| hash_from_magnet(&link));
    let seeders = r.Seeders.unwrap_or(-1);
    let leechers = match (r.Peers, r.Seeders) {
        (Some(peers), Some(seeders)) => (peers - seeders).max(0),
        _ => -1,
    };

    Some(RawHit {
        title,
        link,
        size: r.Size.unwrap_or(-1),
        seeders,
        leechers,
        hash,
        source: source.to_string(),
    })
}

#[async_trait]
impl SourceAdapter for JackettAdapter {
    fn name(&self) -> &str {
        "jackett"
    }

    fn check_auth(&self) -> Result<(), AdapterError> {
        if self.config.api_key.is_empty() {
            return Err(AdapterError::AuthFailed(
                "Jackett API key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    async fn search(
        &self,
        strings: &SearchStrings,
        _episode: Option<&WantedEpisode>,
    ) -> Result<Vec<RawHit>, AdapterError> {
        let mut hits = Vec::new();
        let mut last_error = None;

        for query in &strings.strings {
            match self.search_one(query).await {
                Ok(mut found) => hits.append(&mut found),
                // No point trying the remaining strings with bad credentials
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!(query = %query, error = %e, "Jackett query failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if hits.is_empty() => Err(e),
            _ => Ok(hits),
        }
    }
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    #[serde(default)]
    Title: String,
    MagnetUri: Option<String>,
    Link: Option<String>,
    InfoHash: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i32>,
    Peers: Option<i32>,
}
