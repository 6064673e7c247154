//! Types for the name-matching cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::ParsedRelease;
use crate::quality::Quality;

/// A release observed during a search pass.
///
/// Rows are written for hits that were accepted and for hits that were
/// plausible but did not fit the current search, so a later pass can use
/// them without querying the sources again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRow {
    pub show_id: u64,
    /// Normalized release title.
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default)]
    pub episodes: Vec<u32>,
    pub quality: Quality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Size in bytes, -1 when unknown.
    pub size: i64,
    /// Source adapter that produced the hit.
    pub source: String,
    pub added_at: DateTime<Utc>,
}

/// Season and episodes a row is stored under.
///
/// Lookups match on canonical numbering, so rows only carry numbers that
/// are known to be canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowNumbering {
    /// The numbers in the title are canonical.
    Parsed,
    /// The release was resolved to these canonical numbers.
    Canonical(u32, Vec<u32>),
    /// Scene numbers with no known canonical mapping. Stored without a
    /// season so lookups never serve the row.
    Unknown,
}

impl CacheRow {
    /// Build a row from a parsed release.
    pub fn from_parse(
        title: &str,
        url: &str,
        size: i64,
        source: &str,
        parsed: &ParsedRelease,
        numbering: RowNumbering,
    ) -> Self {
        let (season, episodes) = match numbering {
            RowNumbering::Parsed => (parsed.season_number, parsed.episode_numbers.clone()),
            RowNumbering::Canonical(season, episodes) => (Some(season), episodes),
            RowNumbering::Unknown => (None, Vec::new()),
        };

        Self {
            show_id: parsed.show_id,
            title: title.to_string(),
            url: url.to_string(),
            season,
            episodes,
            quality: parsed.quality,
            release_group: parsed.release_group.clone(),
            version: parsed.version,
            size,
            source: source.to_string(),
            added_at: Utc::now(),
        }
    }
}

pub(crate) fn encode_episodes(episodes: &[u32]) -> String {
    let mut out = String::from("|");
    for ep in episodes {
        out.push_str(&ep.to_string());
        out.push('|');
    }
    out
}

pub(crate) fn decode_episodes(column: &str) -> Vec<u32> {
    column
        .split('|')
        .filter_map(|part| part.parse::<u32>().ok())
        .collect()
}

/// Errors for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for CacheError {
    fn from(e: rusqlite::Error) -> Self {
        CacheError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_column_encoding() {
        assert_eq!(encode_episodes(&[]), "|");
        assert_eq!(encode_episodes(&[1, 2]), "|1|2|");
        assert_eq!(decode_episodes("|1|2|"), vec![1, 2]);
        assert_eq!(decode_episodes("|"), Vec::<u32>::new());
        assert_eq!(decode_episodes("|x|3|"), vec![3]);
    }

    #[test]
    fn test_from_parse_numbering() {
        let parsed = ParsedRelease {
            show_id: 9,
            series_name: "Show".to_string(),
            season_number: Some(3),
            episode_numbers: vec![1],
            absolute_numbers: vec![],
            quality: Quality::Unknown,
            release_group: Some("GRP".to_string()),
            version: None,
            air_date: None,
            is_anime: false,
            scene_numbered: false,
        };
        let row = |numbering| CacheRow::from_parse("Show.S03E01", "http://x", -1, "mock", &parsed, numbering);

        let parsed_row = row(RowNumbering::Parsed);
        assert_eq!(parsed_row.season, Some(3));
        assert_eq!(parsed_row.episodes, vec![1]);
        assert_eq!(parsed_row.show_id, 9);

        let canonical = row(RowNumbering::Canonical(2, vec![11]));
        assert_eq!(canonical.season, Some(2));
        assert_eq!(encode_episodes(&canonical.episodes), "|11|");

        let unknown = row(RowNumbering::Unknown);
        assert_eq!(unknown.season, None);
        assert!(unknown.episodes.is_empty());
        assert_eq!(unknown.release_group.as_deref(), Some("GRP"));
    }
}
