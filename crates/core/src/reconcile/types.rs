//! Types for the reconciliation engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::cache::CacheError;
use crate::quality::Quality;
use crate::show::EpisodeRef;

/// A release accepted for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCandidate {
    pub show_id: u64,
    /// Canonical episodes covered. Empty for a full-season release.
    pub episodes: Vec<EpisodeRef>,
    pub url: String,
    pub title: String,
    pub quality: Quality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Size in bytes, -1 when unknown.
    pub size: i64,
    /// Source adapter (or cache) the candidate came from.
    pub source: String,
    /// Whether this candidate was served from the name cache.
    #[serde(default)]
    pub from_cache: bool,
}

impl DownloadCandidate {
    /// Result bucket this candidate is filed under.
    pub fn bucket_key(&self) -> BucketKey {
        match self.episodes.as_slice() {
            [] => BucketKey::FullSeason,
            [single] => BucketKey::Episode(single.episode),
            _ => BucketKey::MultiEpisode,
        }
    }
}

/// Logical grouping of accepted candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKey {
    /// Releases covering exactly one episode, keyed by its number.
    Episode(u32),
    /// Releases covering more than one episode.
    MultiEpisode,
    /// Whole-season releases.
    FullSeason,
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketKey::Episode(n) => write!(f, "episode:{}", n),
            BucketKey::MultiEpisode => write!(f, "multi_episode"),
            BucketKey::FullSeason => write!(f, "full_season"),
        }
    }
}

/// Candidates of one pass, grouped by bucket.
pub type SearchResults = BTreeMap<BucketKey, Vec<DownloadCandidate>>;

/// File `candidate` under its bucket.
pub fn file_candidate(results: &mut SearchResults, candidate: DownloadCandidate) {
    results
        .entry(candidate.bucket_key())
        .or_default()
        .push(candidate);
}

/// Total number of candidates across buckets.
pub fn candidate_count(results: &SearchResults) -> usize {
    results.values().map(Vec::len).sum()
}

/// Search mode of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Look for individual episode releases.
    #[default]
    #[serde(rename = "eponly", alias = "episode")]
    Episode,
    /// Look for season packs.
    #[serde(rename = "sponly", alias = "season")]
    Season,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Episode => "eponly",
            SearchMode::Season => "sponly",
        }
    }
}

/// Why a hit was not accepted. Used for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitDecision {
    Accepted,
    Cached,
    Unparseable,
    Unwanted,
    BelowThreshold,
    QualityExcluded,
}

impl HitDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitDecision::Accepted => "accepted",
            HitDecision::Cached => "cached",
            HitDecision::Unparseable => "unparseable",
            HitDecision::Unwanted => "unwanted",
            HitDecision::BelowThreshold => "below_threshold",
            HitDecision::QualityExcluded => "quality_excluded",
        }
    }
}

/// Pass-level reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The cache batch could not be written. The pass results are intact.
    #[error("Failed to write cache batch: {error}")]
    CacheWrite {
        error: CacheError,
        results: SearchResults,
    },
}

impl ReconcileError {
    /// Results computed before the failure.
    pub fn into_results(self) -> SearchResults {
        match self {
            ReconcileError::CacheWrite { results, .. } => results,
        }
    }
}
