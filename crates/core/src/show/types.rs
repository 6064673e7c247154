//! Show and episode types consumed by the reconciliation engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quality::QualityTier;

/// Identity and numbering flags of a show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowInfo {
    /// Indexer id of the show.
    pub id: u64,
    /// Canonical show name.
    pub name: String,
    /// Alternate names release groups use for the whole show.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,
    /// Names used only for a specific (scene) season.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub season_names: BTreeMap<u32, Vec<String>>,
    #[serde(default)]
    pub air_by_date: bool,
    #[serde(default)]
    pub sports: bool,
    #[serde(default)]
    pub anime: bool,
    /// Whether releases for this show follow scene numbering.
    #[serde(default)]
    pub is_scene: bool,
}

impl ShowInfo {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            alternate_names: Vec::new(),
            season_names: BTreeMap::new(),
            air_by_date: false,
            sports: false,
            anime: false,
            is_scene: false,
        }
    }

    /// Shows whose episodes are identified by air date rather than number.
    pub fn is_date_driven(&self) -> bool {
        self.air_by_date || self.sports
    }

    /// Every name a release of this show could plausibly carry.
    ///
    /// Includes the canonical name, alternates, names registered for
    /// `season`, and variants with a trailing parenthesized country or
    /// year removed. Duplicates are dropped, first occurrence wins.
    pub fn all_possible_names(&self, season: Option<u32>) -> Vec<String> {
        let mut base: Vec<&str> = vec![self.name.as_str()];
        base.extend(self.alternate_names.iter().map(String::as_str));
        if let Some(names) = season.and_then(|s| self.season_names.get(&s)) {
            base.extend(names.iter().map(String::as_str));
        }

        let mut names: Vec<String> = Vec::new();
        for name in base {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            push_unique(&mut names, name.to_string());

            if let Some(open) = name.rfind(" (") {
                if name.ends_with(')') {
                    let inner = &name[open + 2..name.len() - 1];
                    let stem = &name[..open];
                    push_unique(&mut names, format!("{} {}", stem, inner));
                    push_unique(&mut names, stem.to_string());
                }
            }
        }
        names
    }
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
        names.push(name);
    }
}

/// An episode a caller wants results for.
///
/// Scene numbering may differ from canonical numbering; `is_scene` selects
/// which pair is compared against parsed releases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WantedEpisode {
    pub show_id: u64,
    pub season: u32,
    pub episode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_number: Option<u32>,
    pub scene_season: u32,
    pub scene_episode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_absolute_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    #[serde(default)]
    pub air_by_date: bool,
    #[serde(default)]
    pub sports: bool,
    #[serde(default)]
    pub anime: bool,
    #[serde(default)]
    pub is_scene: bool,
}

impl WantedEpisode {
    /// Create an episode of `show` with scene numbering equal to canonical.
    pub fn new(show: &ShowInfo, season: u32, episode: u32) -> Self {
        Self {
            show_id: show.id,
            season,
            episode,
            absolute_number: None,
            scene_season: season,
            scene_episode: episode,
            scene_absolute_number: None,
            air_date: None,
            air_by_date: show.air_by_date,
            sports: show.sports,
            anime: show.anime,
            is_scene: show.is_scene,
        }
    }

    pub fn with_scene(mut self, season: u32, episode: u32) -> Self {
        self.scene_season = season;
        self.scene_episode = episode;
        self
    }

    pub fn with_absolute(mut self, absolute: u32) -> Self {
        self.absolute_number = Some(absolute);
        if self.scene_absolute_number.is_none() {
            self.scene_absolute_number = Some(absolute);
        }
        self
    }

    pub fn with_scene_absolute(mut self, absolute: u32) -> Self {
        self.scene_absolute_number = Some(absolute);
        self
    }

    pub fn with_air_date(mut self, air_date: NaiveDate) -> Self {
        self.air_date = Some(air_date);
        self
    }

    pub fn is_date_driven(&self) -> bool {
        self.air_by_date || self.sports
    }

    /// Season compared against parsed releases.
    pub fn effective_season(&self) -> u32 {
        if self.is_scene {
            self.scene_season
        } else {
            self.season
        }
    }

    /// Episode number compared against parsed releases.
    pub fn effective_episode(&self) -> u32 {
        if self.is_scene {
            self.scene_episode
        } else {
            self.episode
        }
    }

    /// Absolute number compared against parsed anime releases.
    pub fn effective_absolute(&self) -> Option<u32> {
        if self.is_scene {
            self.scene_absolute_number.or(self.absolute_number)
        } else {
            self.absolute_number
        }
    }

    pub fn episode_ref(&self) -> EpisodeRef {
        EpisodeRef {
            season: self.season,
            episode: self.episode,
        }
    }
}

/// Canonical (season, episode) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeRef {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

/// Status of an episode in the show library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    Unaired,
    #[default]
    Wanted,
    Skipped,
    Ignored,
    Archived,
    Snatched,
    Downloaded,
}

/// A known episode of a show, as kept by the show library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub season: u32,
    pub episode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: EpisodeStatus,
    /// Quality of the currently snatched or downloaded release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityTier>,
}

/// Which qualities a show accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityProfile {
    /// Qualities acceptable for a first download.
    #[serde(default = "default_allowed")]
    pub allowed: Vec<QualityTier>,
    /// Qualities worth upgrading an existing download to.
    #[serde(default)]
    pub preferred: Vec<QualityTier>,
    /// Whether releases with no recognizable quality are acceptable.
    #[serde(default = "default_allow_unknown")]
    pub allow_unknown: bool,
}

impl Default for QualityProfile {
    fn default() -> Self {
        Self {
            allowed: default_allowed(),
            preferred: Vec::new(),
            allow_unknown: default_allow_unknown(),
        }
    }
}

fn default_allowed() -> Vec<QualityTier> {
    QualityTier::ALL.to_vec()
}

fn default_allow_unknown() -> bool {
    true
}

/// A show together with its quality profile and known episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRecord {
    pub show: ShowInfo,
    #[serde(default)]
    pub profile: QualityProfile,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}
