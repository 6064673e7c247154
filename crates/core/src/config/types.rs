use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::reconcile::{NamingPattern, SearchMode};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub jackett: Option<JackettConfig>,
}

/// Location of the name cache database.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("trawler.db")
}

/// Per-pass search settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,
    /// Hits reporting fewer seeders are dropped. Unknown counts are kept.
    #[serde(default)]
    pub min_seeders: u32,
    /// Hits reporting fewer leechers are dropped. Unknown counts are kept.
    #[serde(default)]
    pub min_leechers: u32,
    /// Allow re-downloading an episode at the quality it already has.
    #[serde(default)]
    pub download_current_quality: bool,
    /// The pass was requested by a user rather than a scheduler.
    #[serde(default)]
    pub manual_search: bool,
    #[serde(default)]
    pub naming_pattern: NamingPattern,
}

/// Quality classification settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct QualityConfig {
    /// When false, HEVC/x265 releases are excluded outright.
    #[serde(default = "default_allow_hevc")]
    pub allow_hevc: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            allow_hevc: default_allow_hevc(),
        }
    }
}

fn default_allow_hevc() -> bool {
    true
}

/// Jackett source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Base URL, e.g. "http://jackett.lan:9117"
    pub url: String,
    pub api_key: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Indexer to query; "all" uses Jackett's aggregate indexer
    #[serde(default = "default_indexer")]
    pub indexer: String,
}

fn default_timeout() -> u32 {
    30
}

fn default_indexer() -> String {
    "all".to_string()
}

/// Config as logged at startup, with the Jackett key replaced by a flag.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub quality: QualityConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackett: Option<SanitizedJackettConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub indexer: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            database: config.database.clone(),
            search: config.search.clone(),
            quality: config.quality.clone(),
            jackett: config.jackett.as_ref().map(|j| SanitizedJackettConfig {
                url: j.url.clone(),
                api_key_configured: !j.api_key.is_empty(),
                timeout_secs: j.timeout_secs,
                indexer: j.indexer.clone(),
            }),
        }
    }
}
