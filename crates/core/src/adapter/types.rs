//! Types for the source adapter system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::show::WantedEpisode;

/// Which kind of search a bucket of strings drives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchStringKind {
    Episode,
    Season,
    Rss,
}

impl SearchStringKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStringKind::Episode => "Episode",
            SearchStringKind::Season => "Season",
            SearchStringKind::Rss => "RSS",
        }
    }
}

/// A bucket of search strings handed to an adapter in one call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStrings {
    pub kind: SearchStringKind,
    pub strings: Vec<String>,
}

impl SearchStrings {
    pub fn new(kind: SearchStringKind, strings: Vec<String>) -> Self {
        Self { kind, strings }
    }

    /// Unfiltered feed pull: a single empty query.
    pub fn rss() -> Self {
        Self::new(SearchStringKind::Rss, vec![String::new()])
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Raw result from a single source, before any parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawHit {
    pub title: String,
    /// Download url or magnet link.
    pub link: String,
    /// Size in bytes, -1 when unknown.
    #[serde(default = "unknown")]
    pub size: i64,
    /// Seeders, -1 when unknown.
    #[serde(default = "unknown_count")]
    pub seeders: i32,
    /// Leechers, -1 when unknown.
    #[serde(default = "unknown_count")]
    pub leechers: i32,
    /// Info hash (uppercase hex) when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Adapter that produced the hit.
    #[serde(default)]
    pub source: String,
}

fn unknown() -> i64 {
    -1
}

fn unknown_count() -> i32 {
    -1
}

impl RawHit {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            size: -1,
            seeders: -1,
            leechers: -1,
            hash: None,
            source: String::new(),
        }
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn with_peers(mut self, seeders: i32, leechers: i32) -> Self {
        self.seeders = seeders;
        self.leechers = leechers;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Errors that can occur while talking to a source.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Source connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Source API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdapterError {
    pub fn is_auth(&self) -> bool {
        matches!(self, AdapterError::AuthFailed(_))
    }
}

/// A search source (indexer site, aggregator, feed).
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source name for logging and cache rows.
    fn name(&self) -> &str;

    /// Verify the source has the credentials it needs.
    fn check_auth(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Establish a session, if the source needs one.
    async fn login(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Run every string of `strings`. An empty result is not an error.
    async fn search(
        &self,
        strings: &SearchStrings,
        episode: Option<&WantedEpisode>,
    ) -> Result<Vec<RawHit>, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_bucket() {
        let rss = SearchStrings::rss();
        assert_eq!(rss.kind, SearchStringKind::Rss);
        assert_eq!(rss.strings, vec![String::new()]);
        assert!(!rss.is_empty());
    }

    #[test]
    fn test_raw_hit_defaults_to_unknown() {
        let json = r#"{"title": "Show.S01E01", "link": "http://x"}"#;
        let hit: RawHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.size, -1);
        assert_eq!(hit.seeders, -1);
        assert_eq!(hit.leechers, -1);
        assert!(hit.hash.is_none());
        assert_eq!(hit, RawHit::new("Show.S01E01", "http://x"));
    }

    #[test]
    fn test_auth_error_detection() {
        assert!(AdapterError::AuthFailed("no key".to_string()).is_auth());
        assert!(!AdapterError::Timeout.is_auth());
    }
}
