//! In-memory episode directory backed by show records.

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use super::{EpisodeDirectory, EpisodeRef, EpisodeStatus, ShowRecord};
use crate::quality::Quality;

/// Episode directory over a fixed set of show records.
///
/// Suitable for callers that load show metadata up front (the CLI reads it
/// from a JSON request) and for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEpisodeDirectory {
    shows: HashMap<u64, ShowRecord>,
}

impl InMemoryEpisodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shows(shows: impl IntoIterator<Item = ShowRecord>) -> Self {
        let mut directory = Self::new();
        for show in shows {
            directory.insert(show);
        }
        directory
    }

    pub fn insert(&mut self, record: ShowRecord) {
        self.shows.insert(record.show.id, record);
    }

    pub fn get(&self, show_id: u64) -> Option<&ShowRecord> {
        self.shows.get(&show_id)
    }
}

impl EpisodeDirectory for InMemoryEpisodeDirectory {
    fn episodes_on_air_date(&self, show_id: u64, air_date: NaiveDate) -> Vec<EpisodeRef> {
        self.shows
            .get(&show_id)
            .map(|record| {
                record
                    .episodes
                    .iter()
                    .filter(|e| e.air_date == Some(air_date))
                    .map(|e| EpisodeRef::new(e.season, e.episode))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn wanted(
        &self,
        show_id: u64,
        episode: EpisodeRef,
        quality: Quality,
        manual_search: bool,
        download_current_quality: bool,
    ) -> bool {
        let Some(record) = self.shows.get(&show_id) else {
            debug!(show_id, "Unknown show, episode not wanted");
            return false;
        };

        let Some(ep) = record
            .episodes
            .iter()
            .find(|e| e.season == episode.season && e.episode == episode.episode)
        else {
            debug!(
                show_id,
                season = episode.season,
                episode = episode.episode,
                "Unknown episode, not wanted"
            );
            return false;
        };

        let profile = &record.profile;
        let acceptable = match quality {
            Quality::None => false,
            Quality::Unknown => profile.allow_unknown,
            Quality::Known(tier) => {
                profile.allowed.contains(&tier) || profile.preferred.contains(&tier)
            }
        };
        if !acceptable {
            debug!(
                show_id,
                season = episode.season,
                episode = episode.episode,
                quality = %quality,
                "Quality not in profile"
            );
            return false;
        }

        match ep.status {
            EpisodeStatus::Wanted | EpisodeStatus::Unaired => true,
            EpisodeStatus::Skipped | EpisodeStatus::Ignored | EpisodeStatus::Archived => {
                manual_search
            }
            EpisodeStatus::Snatched | EpisodeStatus::Downloaded => {
                let tier = quality.tier();
                if manual_search && download_current_quality && tier.is_some() && tier == ep.quality
                {
                    return true;
                }
                match tier {
                    Some(tier) if profile.preferred.contains(&tier) => {
                        ep.quality.map(|current| tier > current).unwrap_or(true)
                    }
                    _ => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityTier;
    use crate::show::{EpisodeRecord, QualityProfile, ShowInfo};

    fn record(status: EpisodeStatus, quality: Option<QualityTier>) -> ShowRecord {
        ShowRecord {
            show: ShowInfo::new(1, "Show"),
            profile: QualityProfile {
                allowed: vec![QualityTier::Hdtv, QualityTier::FullHdWebdl],
                preferred: vec![QualityTier::FullHdBluray],
                allow_unknown: false,
            },
            episodes: vec![
                EpisodeRecord {
                    season: 1,
                    episode: 1,
                    air_date: NaiveDate::from_ymd_opt(2024, 3, 1),
                    status,
                    quality,
                },
                EpisodeRecord {
                    season: 0,
                    episode: 3,
                    air_date: NaiveDate::from_ymd_opt(2024, 3, 1),
                    status: EpisodeStatus::Skipped,
                    quality: None,
                },
            ],
        }
    }

    const HD: Quality = Quality::Known(QualityTier::Hdtv);
    const FHD_BLURAY: Quality = Quality::Known(QualityTier::FullHdBluray);

    #[test]
    fn test_wanted_status_accepts_allowed_quality() {
        let dir = InMemoryEpisodeDirectory::with_shows([record(EpisodeStatus::Wanted, None)]);
        assert!(dir.wanted(1, EpisodeRef::new(1, 1), HD, false, false));
        assert!(!dir.wanted(1, EpisodeRef::new(1, 1), Quality::Unknown, false, false));
        assert!(!dir.wanted(
            1,
            EpisodeRef::new(1, 1),
            Quality::Known(QualityTier::Sdtv),
            false,
            false
        ));
    }

    #[test]
    fn test_skipped_only_on_manual_search() {
        let dir = InMemoryEpisodeDirectory::with_shows([record(EpisodeStatus::Skipped, None)]);
        assert!(!dir.wanted(1, EpisodeRef::new(1, 1), HD, false, false));
        assert!(dir.wanted(1, EpisodeRef::new(1, 1), HD, true, false));
    }

    #[test]
    fn test_downloaded_upgrades_only_to_preferred() {
        let dir = InMemoryEpisodeDirectory::with_shows([record(
            EpisodeStatus::Downloaded,
            Some(QualityTier::Hdtv),
        )]);
        assert!(!dir.wanted(1, EpisodeRef::new(1, 1), HD, false, false));
        assert!(dir.wanted(1, EpisodeRef::new(1, 1), FHD_BLURAY, false, false));
        // Same quality again only for a manual search that asks for it.
        assert!(dir.wanted(1, EpisodeRef::new(1, 1), HD, true, true));
        assert!(!dir.wanted(1, EpisodeRef::new(1, 1), HD, true, false));
    }

    #[test]
    fn test_unknown_show_or_episode_not_wanted() {
        let dir = InMemoryEpisodeDirectory::with_shows([record(EpisodeStatus::Wanted, None)]);
        assert!(!dir.wanted(2, EpisodeRef::new(1, 1), HD, false, false));
        assert!(!dir.wanted(1, EpisodeRef::new(4, 4), HD, false, false));
    }

    #[test]
    fn test_episodes_on_air_date() {
        let dir = InMemoryEpisodeDirectory::with_shows([record(EpisodeStatus::Wanted, None)]);
        let rows = dir.episodes_on_air_date(1, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(rows, vec![EpisodeRef::new(1, 1), EpisodeRef::new(0, 3)]);
        assert!(dir
            .episodes_on_air_date(1, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
            .is_empty());
    }
}
