//! JSON input files for the `search` and `rss` commands.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use trawler_core::{InMemoryEpisodeDirectory, SearchMode, ShowInfo, ShowRecord, WantedEpisode};

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {:?}", path))
}

/// The shows a pass knows about.
#[derive(Debug, Deserialize)]
pub struct Library {
    pub shows: Vec<ShowRecord>,
}

impl Library {
    pub fn show_infos(&self) -> Vec<ShowInfo> {
        self.shows.iter().map(|r| r.show.clone()).collect()
    }

    pub fn directory(&self) -> InMemoryEpisodeDirectory {
        InMemoryEpisodeDirectory::with_shows(self.shows.iter().cloned())
    }
}

/// One episode to search for. Scene numbers default to the canonical ones.
#[derive(Debug, Deserialize)]
pub struct EpisodeRequest {
    pub season: u32,
    pub episode: u32,
    #[serde(default)]
    pub scene_season: Option<u32>,
    #[serde(default)]
    pub scene_episode: Option<u32>,
    #[serde(default)]
    pub absolute_number: Option<u32>,
    #[serde(default)]
    pub scene_absolute_number: Option<u32>,
    #[serde(default)]
    pub air_date: Option<NaiveDate>,
}

/// Input of `trawler search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub library: Library,
    pub show_id: u64,
    pub episodes: Vec<EpisodeRequest>,
    #[serde(default)]
    pub mode: Option<SearchMode>,
}

impl SearchRequest {
    /// The library record of the show being searched.
    pub fn show(&self) -> Result<&ShowRecord> {
        self.library
            .shows
            .iter()
            .find(|r| r.show.id == self.show_id)
            .with_context(|| format!("Show {} is not in the request's library", self.show_id))
    }

    /// Build the wanted episodes, taking missing air dates from the library.
    pub fn wanted_episodes(&self, record: &ShowRecord) -> Vec<WantedEpisode> {
        self.episodes
            .iter()
            .map(|req| {
                let mut wanted = WantedEpisode::new(&record.show, req.season, req.episode)
                    .with_scene(
                        req.scene_season.unwrap_or(req.season),
                        req.scene_episode.unwrap_or(req.episode),
                    );
                if let Some(absolute) = req.absolute_number {
                    wanted = wanted.with_absolute(absolute);
                }
                if let Some(absolute) = req.scene_absolute_number {
                    wanted = wanted.with_scene_absolute(absolute);
                }
                let air_date = req.air_date.or_else(|| {
                    record
                        .episodes
                        .iter()
                        .find(|e| e.season == req.season && e.episode == req.episode)
                        .and_then(|e| e.air_date)
                });
                if let Some(air_date) = air_date {
                    wanted = wanted.with_air_date(air_date);
                }
                wanted
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REQUEST: &str = r#"{
        "shows": [
            {
                "show": { "id": 1, "name": "Show", "is_scene": true },
                "episodes": [
                    { "season": 1, "episode": 13, "air_date": "2024-03-05" },
                    { "season": 2, "episode": 1, "status": "downloaded", "quality": "hdtv" }
                ]
            },
            { "show": { "id": 2, "name": "Other Show" } }
        ],
        "show_id": 1,
        "mode": "sponly",
        "episodes": [
            { "season": 1, "episode": 13, "scene_season": 2, "scene_episode": 1 },
            { "season": 2, "episode": 1, "absolute_number": 14 }
        ]
    }"#;

    #[test]
    fn test_parse_search_request() {
        let request: SearchRequest = serde_json::from_str(REQUEST).unwrap();
        assert_eq!(request.library.shows.len(), 2);
        assert_eq!(request.mode, Some(SearchMode::Season));
        assert_eq!(request.library.show_infos()[1].name, "Other Show");

        let record = request.show().unwrap();
        assert_eq!(record.show.name, "Show");
    }

    #[test]
    fn test_wanted_episodes_fill_scene_numbers_and_air_dates() {
        let request: SearchRequest = serde_json::from_str(REQUEST).unwrap();
        let record = request.show().unwrap();
        let wanted = request.wanted_episodes(record);

        assert_eq!(wanted[0].effective_season(), 2);
        assert_eq!(wanted[0].effective_episode(), 1);
        assert_eq!(wanted[0].air_date, NaiveDate::from_ymd_opt(2024, 3, 5));

        assert_eq!(wanted[1].effective_season(), 2);
        assert_eq!(wanted[1].effective_absolute(), Some(14));
        assert_eq!(wanted[1].air_date, None);
    }

    #[test]
    fn test_unknown_show_is_an_error() {
        let mut request: SearchRequest = serde_json::from_str(REQUEST).unwrap();
        request.show_id = 99;
        assert!(request.show().is_err());
    }

    #[test]
    fn test_read_json_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "shows": [ {{ "show": {{ "id": 7, "name": "Show" }} }} ] }}"#).unwrap();

        let library: Library = read_json(file.path()).unwrap();
        assert_eq!(library.shows[0].show.id, 7);
        assert!(library.shows[0].profile.allow_unknown);
    }

    #[test]
    fn test_read_json_missing_file() {
        let err = read_json::<Library>(Path::new("/nonexistent/library.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
