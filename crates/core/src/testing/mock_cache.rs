//! Mock name cache for testing.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{CacheError, CacheRow, NameCache};
use crate::reconcile::DownloadCandidate;
use crate::show::{EpisodeDirectory, EpisodeRef, WantedEpisode};

/// Mock implementation of the NameCache trait.
///
/// Lookups only return what the test configured with `set_cached`; rows
/// written by a pass are recorded but never fed back into lookups.
#[derive(Debug, Clone, Default)]
pub struct MockNameCache {
    cached: Arc<Mutex<HashMap<EpisodeRef, Vec<DownloadCandidate>>>>,
    batches: Arc<Mutex<Vec<Vec<CacheRow>>>>,
    lookups: Arc<Mutex<Vec<EpisodeRef>>>,
    fail_writes: Arc<Mutex<bool>>,
    fail_lookups: Arc<Mutex<bool>>,
}

impl MockNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `candidates` for lookups of `episode`.
    pub fn set_cached(&self, episode: EpisodeRef, candidates: Vec<DownloadCandidate>) {
        if let Ok(mut cached) = self.cached.lock() {
            cached.insert(episode, candidates);
        }
    }

    /// Make every `insert_batch` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    /// Make every `lookup` fail.
    pub fn set_fail_lookups(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_lookups.lock() {
            *flag = fail;
        }
    }

    /// Batches written so far, in order.
    pub fn batches(&self) -> Vec<Vec<CacheRow>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// All rows written so far.
    pub fn rows(&self) -> Vec<CacheRow> {
        self.batches().into_iter().flatten().collect()
    }

    /// Episodes looked up so far.
    pub fn lookups(&self) -> Vec<EpisodeRef> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn flag(flag: &Mutex<bool>) -> bool {
        flag.lock().map(|f| *f).unwrap_or(false)
    }
}

impl NameCache for MockNameCache {
    fn lookup(
        &self,
        episode: &WantedEpisode,
        _directory: &dyn EpisodeDirectory,
        _manual_search: bool,
        _download_current_quality: bool,
    ) -> Result<Option<Vec<DownloadCandidate>>, CacheError> {
        let key = episode.episode_ref();
        self.lookups
            .lock()
            .map_err(|_| CacheError::LockPoisoned)?
            .push(key);

        if Self::flag(&self.fail_lookups) {
            return Err(CacheError::Database("simulated lookup failure".to_string()));
        }

        let cached = self.cached.lock().map_err(|_| CacheError::LockPoisoned)?;
        Ok(cached.get(&key).filter(|c| !c.is_empty()).cloned())
    }

    fn insert_batch(&self, rows: &[CacheRow]) -> Result<usize, CacheError> {
        if Self::flag(&self.fail_writes) {
            return Err(CacheError::Database("simulated write failure".to_string()));
        }
        self.batches
            .lock()
            .map_err(|_| CacheError::LockPoisoned)?
            .push(rows.to_vec());
        Ok(rows.len())
    }

    fn list_propers(&self, since: DateTime<Utc>) -> Result<Vec<CacheRow>, CacheError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|row| row.added_at >= since)
            .filter(|row| {
                ["PROPER", "REPACK", "REAL"]
                    .iter()
                    .any(|tag| row.title.contains(&format!(".{}.", tag)))
            })
            .collect())
    }
}
