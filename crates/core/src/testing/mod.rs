//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the engine's collaborator
//! traits, allowing search passes to be exercised without real sources.
//!
//! # Example
//!
//! ```rust,ignore
//! use trawler_core::testing::{fixtures, MockAdapter, MockNameCache};
//!
//! let adapter = MockAdapter::with_hits("mock", vec![fixtures::raw_hit("Show.S01E01.720p")]);
//! let cache = MockNameCache::new();
//!
//! // Build a reconciler over the mocks and run a pass...
//! ```

mod mock_adapter;
mod mock_cache;

pub use mock_adapter::{MockAdapter, RecordedSearch};
pub use mock_cache::MockNameCache;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::adapter::RawHit;
    use crate::cache::NameCache;
    use crate::parser::SceneNameParser;
    use crate::quality::{Quality, QualityTier, SceneQualityClassifier};
    use crate::reconcile::{DownloadCandidate, Reconciler};
    use crate::show::{
        EpisodeRecord, EpisodeRef, EpisodeStatus, InMemoryEpisodeDirectory, ShowInfo, ShowRecord,
    };

    /// Create a raw hit with a download link derived from the title.
    pub fn raw_hit(title: &str) -> RawHit {
        RawHit::new(
            title,
            format!("http://tracker.example/dl/{}.torrent", title.replace(' ', ".")),
        )
        .with_size(1024 * 1024 * 350) // 350 MB
        .with_peers(50, 10)
    }

    /// Create a standard show.
    pub fn show(id: u64, name: &str) -> ShowInfo {
        ShowInfo::new(id, name)
    }

    /// Create an anime show.
    pub fn anime_show(id: u64, name: &str) -> ShowInfo {
        let mut show = ShowInfo::new(id, name);
        show.anime = true;
        show
    }

    /// Create an air-by-date show.
    pub fn daily_show(id: u64, name: &str) -> ShowInfo {
        let mut show = ShowInfo::new(id, name);
        show.air_by_date = true;
        show
    }

    /// A wanted episode record.
    pub fn wanted_record(season: u32, episode: u32) -> EpisodeRecord {
        EpisodeRecord {
            season,
            episode,
            air_date: None,
            status: EpisodeStatus::Wanted,
            quality: None,
        }
    }

    /// A wanted episode record that aired on `air_date`.
    pub fn aired_record(season: u32, episode: u32, air_date: NaiveDate) -> EpisodeRecord {
        EpisodeRecord {
            air_date: Some(air_date),
            ..wanted_record(season, episode)
        }
    }

    /// A directory holding `show` with the given episodes and default profile.
    pub fn directory(show: &ShowInfo, episodes: Vec<EpisodeRecord>) -> InMemoryEpisodeDirectory {
        InMemoryEpisodeDirectory::with_shows([ShowRecord {
            show: show.clone(),
            profile: Default::default(),
            episodes,
        }])
    }

    /// A cached candidate for a single episode.
    pub fn cached_candidate(show_id: u64, season: u32, episode: u32) -> DownloadCandidate {
        DownloadCandidate {
            show_id,
            episodes: vec![EpisodeRef::new(season, episode)],
            url: format!("http://tracker.example/cached/{}x{}.torrent", season, episode),
            title: format!("Cached.S{:02}E{:02}.720p.HDTV-GRP", season, episode),
            quality: Quality::Known(QualityTier::Hdtv),
            release_group: Some("GRP".to_string()),
            version: None,
            size: -1,
            source: "cache".to_string(),
            from_cache: true,
        }
    }

    /// A reconciler using the scene parser and classifier over `shows`.
    pub fn reconciler(
        shows: Vec<ShowInfo>,
        cache: Arc<dyn NameCache>,
        directory: InMemoryEpisodeDirectory,
    ) -> Reconciler {
        let classifier = Arc::new(SceneQualityClassifier::default());
        let parser = Arc::new(SceneNameParser::new(shows, classifier.clone()));
        Reconciler::new(parser, classifier, cache, Arc::new(directory))
    }
}
