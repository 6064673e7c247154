//! Expansion of wanted episodes into search-string buckets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{SearchStringKind, SearchStrings};
use crate::show::{ShowInfo, WantedEpisode};

/// How season and episode numbers are written in episode searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPattern {
    /// `1x02`
    Compact,
    /// `s01e02`
    Lower,
    /// `S01E02`
    #[default]
    Standard,
    /// `01x02`
    Padded,
    /// `S01 E02`
    Spaced,
}

impl NamingPattern {
    pub fn format(&self, season: u32, episode: u32) -> String {
        match self {
            NamingPattern::Compact => format!("{}x{:02}", season, episode),
            NamingPattern::Lower => format!("s{:02}e{:02}", season, episode),
            NamingPattern::Standard => format!("S{:02}E{:02}", season, episode),
            NamingPattern::Padded => format!("{:02}x{:02}", season, episode),
            NamingPattern::Spaced => format!("S{:02} E{:02}", season, episode),
        }
    }
}

/// Episode-level search strings for `episode`, one or two per show name.
pub fn episode_search_strings(
    show: &ShowInfo,
    episode: &WantedEpisode,
    pattern: NamingPattern,
) -> SearchStrings {
    let mut strings = Vec::new();

    for name in show.all_possible_names(Some(episode.scene_season)) {
        if show.air_by_date || show.sports {
            let Some(air_date) = episode.air_date else {
                debug!(show = %show.name, season = episode.season, episode = episode.episode,
                    "Date-driven episode has no air date, no search string");
                continue;
            };
            let mut s = format!("{} {}", name, air_date.format("%Y %m %d"));
            if show.sports {
                s.push(' ');
                s.push_str(&air_date.format("%b").to_string());
            }
            strings.push(s);
        } else if show.anime {
            match episode.scene_absolute_number.or(episode.absolute_number) {
                Some(absolute) => {
                    strings.push(format!("{} {:03}", name, absolute));
                    strings.push(format!("{} {:02}", name, absolute));
                }
                None => strings.push(format!(
                    "{} {}",
                    name,
                    pattern.format(episode.scene_season, episode.scene_episode)
                )),
            }
        } else {
            strings.push(format!(
                "{} {}",
                name,
                pattern.format(episode.scene_season, episode.scene_episode)
            ));
        }
    }

    SearchStrings::new(SearchStringKind::Episode, strings)
}

/// Season-level search strings for the scene season of `episode`.
pub fn season_search_strings(show: &ShowInfo, episode: &WantedEpisode) -> SearchStrings {
    let mut strings = Vec::new();

    for name in show.all_possible_names(Some(episode.scene_season)) {
        if show.air_by_date || show.sports {
            if let Some(air_date) = episode.air_date {
                strings.push(format!("{} {}", name, air_date.format("%Y")));
            }
        } else if show.anime {
            // All seasons in all formats; release groups rarely number anime seasons.
            strings.push(format!("{} Season", name));
        } else {
            strings.push(format!("{} S{:02}", name, episode.scene_season));
        }
    }

    SearchStrings::new(SearchStringKind::Season, strings)
}

/// Keeps one season search per distinct scene season.
#[derive(Debug, Default)]
pub struct SeasonDedupe {
    searched: HashSet<u32>,
}

impl SeasonDedupe {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time a scene season is seen.
    pub fn first_visit(&mut self, episode: &WantedEpisode) -> bool {
        self.searched.insert(episode.scene_season)
    }
}
