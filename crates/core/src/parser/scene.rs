//! Regex-driven parser for scene and fansub release names.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use super::{NameParseError, ParsedRelease, TitleParser};
use crate::quality::QualityClassifier;
use crate::show::ShowInfo;

static EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:mkv|mp4|avi|m4v|ts|nzb|torrent)$").unwrap());

static LEADING_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<group>[^\]]+)\][. _-]*(?P<rest>.+)$").unwrap());

static TRAILING_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(?P<group>[A-Za-z0-9]+)(?:\[[^\]]*\])?$").unwrap());

static STANDARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.+?)[. _-]+s(?P<season>\d{1,3})[. _-]?e(?P<ep>\d{1,4})(?P<extra>(?:[. _]?-?[. _]?e\d{1,4})*)(?P<rest>(?:[. _-].*)?)$",
    )
    .unwrap()
});

static EXTRA_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?P<dash>-)?[. _]?e(?P<ep>\d{1,4})").unwrap());

static FOV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.+?)[. _-]+(?P<season>\d{1,2})x(?P<ep>\d{2,3})(?:-(?P<ep2>\d{2,3}))?(?P<rest>(?:[. _-].*)?)$",
    )
    .unwrap()
});

static AIR_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.+?)[. _-]+(?P<y>(?:19|20)\d{2})[. _-](?P<m>\d{2})[. _-](?P<d>\d{2})(?P<rest>(?:[. _-].*)?)$",
    )
    .unwrap()
});

static SEASON_PACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.+?)[. _-]+(?:s|season[. _-]?)(?P<season>\d{1,3})(?P<rest>(?:[. _-].*)?)$",
    )
    .unwrap()
});

static ABSOLUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.+?)[. _]+-?[. _]*(?P<abs>\d{2,4})(?:-(?P<abs2>\d{2,4}))?(?:v(?P<version>\d))?(?P<rest>(?:[. _\[(-].*)?)$",
    )
    .unwrap()
});

static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<stem>.+?) (?:19|20)\d{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Standard,
    Fov,
    AirDate,
    SeasonPack,
    Absolute,
}

impl Pattern {
    fn regex(&self) -> &'static Regex {
        match self {
            Pattern::Standard => &*STANDARD,
            Pattern::Fov => &*FOV,
            Pattern::AirDate => &*AIR_DATE,
            Pattern::SeasonPack => &*SEASON_PACK,
            Pattern::Absolute => &*ABSOLUTE,
        }
    }
}

const NORMAL_ORDER: [Pattern; 4] = [
    Pattern::Standard,
    Pattern::Fov,
    Pattern::AirDate,
    Pattern::SeasonPack,
];

const ANIME_ORDER: [Pattern; 5] = [
    Pattern::Standard,
    Pattern::AirDate,
    Pattern::Fov,
    Pattern::Absolute,
    Pattern::SeasonPack,
];

/// Numbers extracted by one pattern, before show resolution.
#[derive(Debug, Default)]
struct Extracted {
    name: String,
    season: Option<u32>,
    episodes: Vec<u32>,
    absolute: Vec<u32>,
    version: Option<u32>,
    air_date: Option<NaiveDate>,
}

/// Release name parser that resolves titles against a set of known shows.
pub struct SceneNameParser {
    /// Normalized show name -> show.
    names: HashMap<String, ShowInfo>,
    classifier: Arc<dyn QualityClassifier>,
}

impl SceneNameParser {
    pub fn new(
        shows: impl IntoIterator<Item = ShowInfo>,
        classifier: Arc<dyn QualityClassifier>,
    ) -> Self {
        let mut names = HashMap::new();
        for show in shows {
            let mut all = show.all_possible_names(None);
            for season_names in show.season_names.values() {
                all.extend(season_names.iter().cloned());
            }
            for name in all {
                names
                    .entry(normalize_name(&name))
                    .or_insert_with(|| show.clone());
            }
        }
        Self { names, classifier }
    }

    fn resolve(&self, raw_name: &str) -> Option<&ShowInfo> {
        let normalized = normalize_name(raw_name);
        if let Some(show) = self.names.get(&normalized) {
            return Some(show);
        }
        TRAILING_YEAR
            .captures(&normalized)
            .and_then(|caps| self.names.get(&caps["stem"]))
    }

    fn extract(pattern: Pattern, caps: &Captures) -> Option<Extracted> {
        let num = |key: &str| caps.name(key).and_then(|m| m.as_str().parse::<u32>().ok());
        let mut extracted = Extracted {
            name: caps["name"].to_string(),
            ..Default::default()
        };

        match pattern {
            Pattern::Standard => {
                extracted.season = num("season");
                let first = num("ep")?;
                extracted.episodes.push(first);
                if let Some(extra) = caps.name("extra") {
                    for m in EXTRA_EPISODE.captures_iter(extra.as_str()) {
                        let Ok(ep) = m["ep"].parse::<u32>() else {
                            continue;
                        };
                        let last = *extracted.episodes.last()?;
                        if m.name("dash").is_some() && ep > last {
                            extracted.episodes.extend(last + 1..=ep);
                        } else if !extracted.episodes.contains(&ep) {
                            extracted.episodes.push(ep);
                        }
                    }
                }
            }
            Pattern::Fov => {
                extracted.season = num("season");
                let first = num("ep")?;
                extracted.episodes.push(first);
                if let Some(last) = num("ep2") {
                    if last > first {
                        extracted.episodes.extend(first + 1..=last);
                    }
                }
            }
            Pattern::AirDate => {
                extracted.air_date = NaiveDate::from_ymd_opt(
                    caps["y"].parse().ok()?,
                    num("m")?,
                    num("d")?,
                );
                extracted.air_date?;
            }
            Pattern::SeasonPack => {
                extracted.season = num("season");
            }
            Pattern::Absolute => {
                let first = num("abs")?;
                extracted.absolute.push(first);
                if let Some(last) = num("abs2") {
                    if last > first {
                        extracted.absolute.extend(first + 1..=last);
                    }
                }
                extracted.version = num("version");
            }
        }

        Some(extracted)
    }
}

impl TitleParser for SceneNameParser {
    fn parse(&self, title: &str, anime: bool) -> Result<ParsedRelease, NameParseError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(NameParseError::InvalidName(title.to_string()));
        }

        let stripped = EXTENSION.replace(trimmed, "");
        let (leading_group, body) = match LEADING_GROUP.captures(&stripped) {
            Some(caps) => (
                Some(caps["group"].to_string()),
                caps["rest"].to_string(),
            ),
            None => (None, stripped.to_string()),
        };

        let order: &[Pattern] = if anime { &ANIME_ORDER } else { &NORMAL_ORDER };
        let mut unresolved: Option<String> = None;

        for pattern in order {
            let Some(caps) = pattern.regex().captures(&body) else {
                continue;
            };
            let Some(extracted) = Self::extract(*pattern, &caps) else {
                continue;
            };
            let Some(show) = self.resolve(&extracted.name) else {
                trace!(pattern = ?pattern, name = %extracted.name, "Name did not resolve to a show");
                unresolved.get_or_insert(extracted.name);
                continue;
            };

            let release_group = TRAILING_GROUP
                .captures(&body)
                .map(|caps| caps["group"].to_string())
                .or(leading_group);
            let is_anime = show.anime || *pattern == Pattern::Absolute;

            return Ok(ParsedRelease {
                show_id: show.id,
                series_name: extracted.name,
                season_number: extracted.season,
                episode_numbers: extracted.episodes,
                absolute_numbers: extracted.absolute,
                quality: self.classifier.classify(title, anime || show.anime),
                release_group,
                version: extracted.version,
                air_date: extracted.air_date,
                is_anime,
                scene_numbered: show.is_scene,
            });
        }

        match unresolved {
            Some(_) => Err(NameParseError::UnknownShow(title.to_string())),
            None => Err(NameParseError::InvalidName(title.to_string())),
        }
    }
}

/// Lowercase, turn punctuation into spaces, collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
