//! Mock source adapter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::adapter::{AdapterError, RawHit, SearchStringKind, SearchStrings, SourceAdapter};
use crate::show::{EpisodeRef, WantedEpisode};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The bucket that was searched.
    pub strings: SearchStrings,
    /// Episode the bucket was built for, if any.
    pub episode: Option<EpisodeRef>,
    /// When the search was made.
    pub timestamp: Instant,
}

/// A handler that produces hits for a single search string.
type QueryHandler = Box<dyn Fn(SearchStringKind, &str) -> Vec<RawHit> + Send + Sync>;

/// Mock implementation of the SourceAdapter trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable hits
/// - Track searches for assertions
/// - Simulate auth and search failures
///
/// # Example
///
/// ```rust,ignore
/// use trawler_core::testing::{MockAdapter, fixtures};
///
/// let adapter = MockAdapter::with_hits("mock", vec![
///     fixtures::raw_hit("Show.S01E01.720p.HDTV-GRP"),
/// ]);
///
/// let hits = adapter.search(&strings, None).await?;
/// assert_eq!(hits.len(), 1);
/// assert_eq!(adapter.search_count().await, 1);
/// ```
pub struct MockAdapter {
    name: String,
    /// Hits returned once per search call when no handler is set.
    hits: Arc<RwLock<Vec<RawHit>>>,
    /// Recorded searches.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<AdapterError>>>,
    /// If set, `check_auth` fails with this message.
    auth_failure: Arc<std::sync::RwLock<Option<String>>>,
    /// Per-string hit generation.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
    /// Number of login calls.
    logins: Arc<RwLock<usize>>,
}

impl std::fmt::Debug for MockAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAdapter")
            .field("name", &self.name)
            .field("hits", &"<hits>")
            .field("searches", &"<searches>")
            .field("next_error", &"<next_error>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl MockAdapter {
    /// Create a new mock adapter with no hits.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_hits(name, Vec::new())
    }

    /// Create a mock adapter that returns `hits` on every search.
    pub fn with_hits(name: impl Into<String>, hits: Vec<RawHit>) -> Self {
        Self {
            name: name.into(),
            hits: Arc::new(RwLock::new(hits)),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            auth_failure: Arc::new(std::sync::RwLock::new(None)),
            query_handler: Arc::new(RwLock::new(None)),
            logins: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the hits to return for subsequent searches.
    pub async fn set_hits(&self, hits: Vec<RawHit>) {
        *self.hits.write().await = hits;
    }

    /// Add a single hit.
    pub async fn add_hit(&self, hit: RawHit) {
        self.hits.write().await.push(hit);
    }

    /// Produce hits per search string instead of the fixed list.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(SearchStringKind, &str) -> Vec<RawHit> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Make the next search fail.
    pub async fn set_next_error(&self, error: AdapterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make `check_auth` fail until cleared.
    pub fn set_auth_failure(&self, message: Option<&str>) {
        if let Ok(mut guard) = self.auth_failure.write() {
            *guard = message.map(str::to_string);
        }
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Get the number of login calls.
    pub async fn login_count(&self) -> usize {
        *self.logins.read().await
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_auth(&self) -> Result<(), AdapterError> {
        let failure = self
            .auth_failure
            .read()
            .map(|guard| guard.clone())
            .unwrap_or(None);
        match failure {
            Some(message) => Err(AdapterError::AuthFailed(message)),
            None => Ok(()),
        }
    }

    async fn login(&self) -> Result<(), AdapterError> {
        *self.logins.write().await += 1;
        Ok(())
    }

    async fn search(
        &self,
        strings: &SearchStrings,
        episode: Option<&WantedEpisode>,
    ) -> Result<Vec<RawHit>, AdapterError> {
        self.searches.write().await.push(RecordedSearch {
            strings: strings.clone(),
            episode: episode.map(WantedEpisode::episode_ref),
            timestamp: Instant::now(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let hits: Vec<RawHit> = match &*self.query_handler.read().await {
            Some(handler) => strings
                .strings
                .iter()
                .flat_map(|s| handler(strings.kind, s.as_str()))
                .collect(),
            None => self.hits.read().await.clone(),
        };

        Ok(hits
            .into_iter()
            .map(|mut hit| {
                if hit.source.is_empty() {
                    hit.source = self.name.clone();
                }
                hit
            })
            .collect())
    }
}
