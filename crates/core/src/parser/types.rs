//! Types produced by release title parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality::Quality;

/// Structured view of a release title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRelease {
    /// Show the title resolved to.
    pub show_id: u64,
    /// Show name as it appeared in the title.
    pub series_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episode_numbers: Vec<u32>,
    /// Absolute episode numbers (anime releases).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub absolute_numbers: Vec<u32>,
    pub quality: Quality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_anime: bool,
    /// The show's releases use scene numbering, so the season and episode
    /// numbers above are scene numbers.
    #[serde(default)]
    pub scene_numbered: bool,
}

impl ParsedRelease {
    pub fn is_air_by_date(&self) -> bool {
        self.air_date.is_some()
    }

    /// A whole-season release: a season number and nothing finer.
    pub fn is_season_pack(&self) -> bool {
        self.season_number.is_some()
            && self.episode_numbers.is_empty()
            && self.absolute_numbers.is_empty()
            && self.air_date.is_none()
    }
}

/// Why a title could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameParseError {
    #[error("Unable to parse release name: {0}")]
    InvalidName(String),

    #[error("Unable to match release to a known show: {0}")]
    UnknownShow(String),
}
