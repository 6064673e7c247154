//! Name-matching cache - releases seen in previous search passes.
//!
//! The cache lets a pass answer "have we already seen a usable release for
//! this episode?" without touching any source adapter.

mod sqlite;
mod types;

pub use sqlite::SqliteNameCache;
pub use types::*;

use chrono::{DateTime, Utc};

use crate::reconcile::DownloadCandidate;
use crate::show::{EpisodeDirectory, WantedEpisode};

/// Trait for name-matching cache storage.
pub trait NameCache: Send + Sync {
    /// Cached candidates covering `episode` that are still wanted.
    ///
    /// Returns `None` when nothing usable is cached. A row only qualifies
    /// when every episode it covers passes the wanted predicate.
    fn lookup(
        &self,
        episode: &WantedEpisode,
        directory: &dyn EpisodeDirectory,
        manual_search: bool,
        download_current_quality: bool,
    ) -> Result<Option<Vec<DownloadCandidate>>, CacheError>;

    /// Persist a batch of rows in a single write.
    ///
    /// Rows with the same title and url as an existing row replace it.
    /// Returns the number of rows written.
    fn insert_batch(&self, rows: &[CacheRow]) -> Result<usize, CacheError>;

    /// PROPER/REPACK/REAL releases cached since `since`.
    fn list_propers(&self, since: DateTime<Utc>) -> Result<Vec<CacheRow>, CacheError>;
}
