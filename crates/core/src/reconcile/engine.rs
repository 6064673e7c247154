//! The reconciliation engine.
//!
//! A pass takes the episodes wanted for one show, serves what it can from
//! the name cache, searches the sources for the rest and decides for every
//! raw hit whether it is accepted, cached for later, or dropped.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::adapter::{RawHit, SearchStrings, SourceAdapter};
use crate::cache::{CacheError, CacheRow, NameCache, RowNumbering};
use crate::config::SearchConfig;
use crate::metrics;
use crate::parser::{ParsedRelease, TitleParser};
use crate::quality::{order_by_quality, QualityClassifier};
use crate::show::{EpisodeDirectory, EpisodeRef, ShowInfo, WantedEpisode};

use super::search_strings::{episode_search_strings, season_search_strings, SeasonDedupe};
use super::types::{
    candidate_count, file_candidate, DownloadCandidate, HitDecision, ReconcileError, SearchMode,
    SearchResults,
};

/// Replace spaces with dots so titles match scene naming.
pub fn normalize_title(title: &str) -> String {
    title.trim().replace(' ', ".")
}

/// Undo the HTML and tracker-parameter escaping some sources apply to links.
pub fn normalize_url(url: &str) -> String {
    url.trim().replace("&amp;", "&").replace("%26tr%3D", "&tr=")
}

/// Episodes a hit was resolved to.
#[derive(Debug)]
struct Resolution {
    season: u32,
    /// Empty for a whole-season release.
    episodes: Vec<EpisodeRef>,
}

impl Resolution {
    /// A row holds one season, so episodes spanning seasons are unknown.
    fn cache_numbering(&self) -> RowNumbering {
        if self.episodes.iter().any(|ep| ep.season != self.season) {
            return RowNumbering::Unknown;
        }
        RowNumbering::Canonical(
            self.season,
            self.episodes.iter().map(|ep| ep.episode).collect(),
        )
    }
}

enum Outcome {
    Accept(Box<DownloadCandidate>, CacheRow),
    Cache(CacheRow),
    Drop(HitDecision),
}

/// Runs search passes against a set of source adapters.
pub struct Reconciler {
    parser: Arc<dyn TitleParser>,
    classifier: Arc<dyn QualityClassifier>,
    cache: Arc<dyn NameCache>,
    directory: Arc<dyn EpisodeDirectory>,
}

impl Reconciler {
    pub fn new(
        parser: Arc<dyn TitleParser>,
        classifier: Arc<dyn QualityClassifier>,
        cache: Arc<dyn NameCache>,
        directory: Arc<dyn EpisodeDirectory>,
    ) -> Self {
        Self {
            parser,
            classifier,
            cache,
            directory,
        }
    }

    /// Run one search pass for `episodes` of `show`.
    ///
    /// Episodes with usable cached results are not searched. When every
    /// episode is served from the cache no adapter is contacted at all.
    /// Season mode issues a season search even for a single episode.
    /// Cache rows produced by the pass are written in a single batch; if
    /// that write fails the computed results travel with the error.
    pub async fn find_search_results(
        &self,
        show: &ShowInfo,
        episodes: &[WantedEpisode],
        adapters: &[Arc<dyn SourceAdapter>],
        config: &SearchConfig,
    ) -> Result<SearchResults, ReconcileError> {
        let start = Instant::now();
        let mode = config.mode.as_str();
        metrics::PASSES_TOTAL.with_label_values(&[mode]).inc();

        let mut results = SearchResults::new();
        let mut cached_episodes = 0usize;
        let mut pending: Vec<(SearchStrings, Option<&WantedEpisode>)> = Vec::new();
        let mut seasons = SeasonDedupe::new();

        for episode in episodes {
            if let Some(candidates) = self.cached_candidates(episode, config) {
                cached_episodes += 1;
                for candidate in candidates {
                    file_candidate(&mut results, candidate);
                }
                continue;
            }

            let strings = match config.mode {
                SearchMode::Season => {
                    if !seasons.first_visit(episode) {
                        continue;
                    }
                    season_search_strings(show, episode)
                }
                SearchMode::Episode => {
                    episode_search_strings(show, episode, config.naming_pattern)
                }
            };
            if !strings.is_empty() {
                pending.push((strings, Some(episode)));
            }
        }

        if cached_episodes == episodes.len() {
            debug!(
                show = %show.name,
                episodes = episodes.len(),
                "All episodes served from cache"
            );
            self.observe_duration(mode, start);
            return Ok(results);
        }

        let hits = self.collect_hits(adapters, &pending).await;
        let ordered = self.order_hits(show, hits, config);

        let mut cache_rows = Vec::new();
        for hit in ordered {
            match self.evaluate(show, episodes, config, &hit) {
                Outcome::Accept(candidate, row) => {
                    info!(
                        title = %candidate.title,
                        source = %candidate.source,
                        quality = %candidate.quality,
                        "Found result"
                    );
                    metrics::HIT_DECISIONS
                        .with_label_values(&[HitDecision::Accepted.as_str()])
                        .inc();
                    file_candidate(&mut results, *candidate);
                    cache_rows.push(row);
                }
                Outcome::Cache(row) => {
                    debug!(title = %row.title, "Adding item from search to cache");
                    metrics::HIT_DECISIONS
                        .with_label_values(&[HitDecision::Cached.as_str()])
                        .inc();
                    cache_rows.push(row);
                }
                Outcome::Drop(decision) => {
                    metrics::HIT_DECISIONS
                        .with_label_values(&[decision.as_str()])
                        .inc();
                }
            }
        }

        let written = self.write_rows(&cache_rows);
        self.observe_duration(mode, start);
        if let Err(error) = written {
            warn!(error = %error, rows = cache_rows.len(), "Failed to write cache batch");
            return Err(ReconcileError::CacheWrite { error, results });
        }

        debug!(
            show = %show.name,
            candidates = candidate_count(&results),
            cache_rows = cache_rows.len(),
            "Search pass complete"
        );
        Ok(results)
    }

    /// Pull every adapter's unfiltered feed and cache what parses.
    ///
    /// Returns the number of cache rows written.
    pub async fn ingest_rss(&self, adapters: &[Arc<dyn SourceAdapter>]) -> Result<usize, CacheError> {
        let start = Instant::now();
        metrics::PASSES_TOTAL.with_label_values(&["rss"]).inc();

        let rss = SearchStrings::rss();
        let pending = [(rss, None)];
        let hits = self.collect_hits(adapters, &pending).await;

        let mut rows = Vec::new();
        for hit in hits {
            let title = normalize_title(&hit.title);
            let url = normalize_url(&hit.link);
            if title.is_empty() || url.is_empty() {
                continue;
            }

            let parsed = match self
                .parser
                .parse(&title, false)
                .or_else(|_| self.parser.parse(&title, true))
            {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!(error = %e, "Skipping feed item");
                    metrics::HIT_DECISIONS
                        .with_label_values(&[HitDecision::Unparseable.as_str()])
                        .inc();
                    continue;
                }
            };

            let numbering = match parsed
                .air_date
                .and_then(|_| self.resolve_air_date(parsed.show_id, &parsed, &title))
            {
                Some(resolution) => resolution.cache_numbering(),
                None => skipped_numbering(&parsed, &[]),
            };
            rows.push(CacheRow::from_parse(
                &title,
                &url,
                hit.size,
                &hit.source,
                &parsed,
                numbering,
            ));
        }

        let written = self.write_rows(&rows);
        self.observe_duration("rss", start);
        let written = written?;
        info!(rows = written, "RSS feeds ingested");
        Ok(written)
    }

    fn cached_candidates(
        &self,
        episode: &WantedEpisode,
        config: &SearchConfig,
    ) -> Option<Vec<DownloadCandidate>> {
        match self.cache.lookup(
            episode,
            self.directory.as_ref(),
            config.manual_search,
            config.download_current_quality,
        ) {
            Ok(Some(candidates)) => {
                metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                debug!(
                    season = episode.season,
                    episode = episode.episode,
                    candidates = candidates.len(),
                    "Cache hit"
                );
                Some(candidates)
            }
            Ok(None) => {
                metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                None
            }
            Err(e) => {
                metrics::CACHE_LOOKUPS.with_label_values(&["error"]).inc();
                warn!(
                    season = episode.season,
                    episode = episode.episode,
                    error = %e,
                    "Cache lookup failed, treating as miss"
                );
                None
            }
        }
    }

    /// Query every adapter sequentially. A failing adapter is skipped for
    /// the rest of the pass; hits it already returned are kept.
    async fn collect_hits(
        &self,
        adapters: &[Arc<dyn SourceAdapter>],
        pending: &[(SearchStrings, Option<&WantedEpisode>)],
    ) -> Vec<RawHit> {
        let mut hits = Vec::new();
        if pending.is_empty() {
            return hits;
        }

        for adapter in adapters {
            let source = adapter.name();

            let ready = match adapter.check_auth() {
                Ok(()) => adapter.login().await,
                Err(e) => Err(e),
            };
            if let Err(e) = ready {
                warn!(source = source, error = %e, "Skipping source");
                metrics::ADAPTER_REQUESTS
                    .with_label_values(&[source, "auth_error"])
                    .inc();
                continue;
            }

            for (strings, episode) in pending {
                match adapter.search(strings, *episode).await {
                    Ok(found) => {
                        metrics::ADAPTER_REQUESTS
                            .with_label_values(&[source, "success"])
                            .inc();
                        metrics::ADAPTER_HITS
                            .with_label_values(&[source])
                            .observe(found.len() as f64);
                        debug!(
                            source = source,
                            kind = strings.kind.as_str(),
                            hits = found.len(),
                            "Source search complete"
                        );
                        hits.extend(found.into_iter().map(|mut hit| {
                            if hit.source.is_empty() {
                                hit.source = source.to_string();
                            }
                            hit
                        }));
                    }
                    Err(e) => {
                        let status = if e.is_auth() { "auth_error" } else { "error" };
                        metrics::ADAPTER_REQUESTS
                            .with_label_values(&[source, status])
                            .inc();
                        warn!(source = source, error = %e, "Source search failed, skipping source");
                        break;
                    }
                }
            }
        }

        hits
    }

    /// Drop hits under the peer thresholds, then order by quality.
    fn order_hits(&self, show: &ShowInfo, hits: Vec<RawHit>, config: &SearchConfig) -> Vec<RawHit> {
        let total = hits.len();
        let hits: Vec<RawHit> = hits
            .into_iter()
            .filter(|hit| meets_threshold(hit, config))
            .collect();
        let below = total - hits.len();
        if below > 0 {
            debug!(hits = below, "Dropped hits under seeder/leecher minimums");
            metrics::HIT_DECISIONS
                .with_label_values(&[HitDecision::BelowThreshold.as_str()])
                .inc_by(below as u64);
        }

        let remaining = hits.len();
        let ordered = order_by_quality(hits, |hit| {
            self.classifier
                .classify(&normalize_title(&hit.title), show.anime)
        });
        let excluded = remaining - ordered.len();
        if excluded > 0 {
            debug!(hits = excluded, "Dropped hits with excluded quality");
            metrics::HIT_DECISIONS
                .with_label_values(&[HitDecision::QualityExcluded.as_str()])
                .inc_by(excluded as u64);
        }

        ordered.into_iter().map(|(hit, _)| hit).collect()
    }

    /// Run one hit through the acceptance rules.
    fn evaluate(
        &self,
        show: &ShowInfo,
        episodes: &[WantedEpisode],
        config: &SearchConfig,
        hit: &RawHit,
    ) -> Outcome {
        let title = normalize_title(&hit.title);
        let url = normalize_url(&hit.link);

        let parsed = match self.parser.parse(&title, show.anime) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Dropping unparseable result");
                return Outcome::Drop(HitDecision::Unparseable);
            }
        };

        let cache_row = |parsed: &ParsedRelease| {
            let numbering = skipped_numbering(parsed, episodes);
            CacheRow::from_parse(&title, &url, hit.size, &hit.source, parsed, numbering)
        };

        if parsed.show_id != show.id {
            debug!(title = %title, "Result is for another show, skipping it");
            return Outcome::Cache(cache_row(&parsed));
        }

        let resolution = if show.is_date_driven() {
            if !parsed.is_air_by_date() {
                debug!(title = %title, "Date search result did not parse as one, skipping it");
                return Outcome::Cache(cache_row(&parsed));
            }
            match self.resolve_air_date(show.id, &parsed, &title) {
                Some(resolution) => resolution,
                None => return Outcome::Cache(cache_row(&parsed)),
            }
        } else {
            let resolved = match config.mode {
                SearchMode::Season => resolve_season_pack(&parsed, episodes, &title),
                SearchMode::Episode => resolve_episodes(&parsed, episodes, &title),
            };
            match resolved {
                Some(resolution) => resolution,
                None => return Outcome::Cache(cache_row(&parsed)),
            }
        };

        let wanted = resolution.episodes.iter().all(|ep| {
            self.directory.wanted(
                show.id,
                *ep,
                parsed.quality,
                config.manual_search,
                config.download_current_quality,
            )
        });
        if !wanted {
            debug!(title = %title, quality = %parsed.quality, "Ignoring unwanted result");
            return Outcome::Drop(HitDecision::Unwanted);
        }

        let row = CacheRow::from_parse(
            &title,
            &url,
            hit.size,
            &hit.source,
            &parsed,
            resolution.cache_numbering(),
        );
        let candidate = DownloadCandidate {
            show_id: show.id,
            episodes: resolution.episodes,
            url,
            title,
            quality: parsed.quality,
            release_group: parsed.release_group,
            version: parsed.version,
            size: hit.size,
            source: hit.source.clone(),
            from_cache: false,
        };
        Outcome::Accept(Box::new(candidate), row)
    }

    /// Map an air-dated release onto a library episode.
    ///
    /// Exactly one episode on the date is authoritative. With exactly two,
    /// one of them a season 0 special, the regular episode wins.
    fn resolve_air_date(&self, show_id: u64, parsed: &ParsedRelease, title: &str) -> Option<Resolution> {
        let air_date = parsed.air_date?;
        let rows = self.directory.episodes_on_air_date(show_id, air_date);

        let chosen = match rows.as_slice() {
            [only] => *only,
            [first, second] if first.season == 0 && second.season != 0 => *second,
            [first, second] if second.season == 0 && first.season != 0 => *first,
            _ => {
                warn!(
                    title = title,
                    air_date = %air_date,
                    episodes = rows.len(),
                    "Could not resolve air date to a single episode, skipping it"
                );
                return None;
            }
        };

        Some(Resolution {
            season: chosen.season,
            episodes: vec![chosen],
        })
    }

    fn write_rows(&self, rows: &[CacheRow]) -> Result<usize, CacheError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let written = self.cache.insert_batch(rows)?;
        metrics::CACHE_ROWS_WRITTEN.inc_by(written as u64);
        Ok(written)
    }

    fn observe_duration(&self, mode: &str, start: Instant) {
        metrics::PASS_DURATION
            .with_label_values(&[mode])
            .observe(start.elapsed().as_secs_f64());
    }
}

fn meets_threshold(hit: &RawHit, config: &SearchConfig) -> bool {
    let enough = |count: i32, minimum: u32| count < 0 || count as u32 >= minimum;
    enough(hit.seeders, config.min_seeders) && enough(hit.leechers, config.min_leechers)
}

/// Season searches only accept whole-season releases of a requested season.
fn resolve_season_pack(
    parsed: &ParsedRelease,
    episodes: &[WantedEpisode],
    title: &str,
) -> Option<Resolution> {
    if !parsed.episode_numbers.is_empty() {
        debug!(title = title, "Season search result is not a season pack, skipping it");
        return None;
    }

    let season = parsed.season_number?;
    let Some(requested) = episodes.iter().find(|ep| ep.effective_season() == season) else {
        debug!(title = title, season = season, "Season result is for a season we are not searching for");
        return None;
    };

    Some(Resolution {
        season: requested.season,
        episodes: Vec::new(),
    })
}

/// Episode searches accept releases naming a requested episode, either by
/// season and episode or, for anime, by absolute number.
fn resolve_episodes(
    parsed: &ParsedRelease,
    episodes: &[WantedEpisode],
    title: &str,
) -> Option<Resolution> {
    if let Some(season) = parsed.season_number {
        let requested = |number: u32| {
            episodes
                .iter()
                .find(|ep| ep.effective_season() == season && ep.effective_episode() == number)
        };

        if parsed.episode_numbers.iter().any(|n| requested(*n).is_some()) {
            // Scene numbers in the title map back to canonical numbers.
            let mut resolved = Vec::with_capacity(parsed.episode_numbers.len());
            for n in &parsed.episode_numbers {
                match requested(*n) {
                    Some(ep) => resolved.push(ep.episode_ref()),
                    None if parsed.scene_numbered => {
                        debug!(
                            title = title,
                            episode = n,
                            "Scene episode has no known canonical number, skipping it"
                        );
                        return None;
                    }
                    None => resolved.push(EpisodeRef::new(season, *n)),
                }
            }
            let season = resolved.first().map(|ep| ep.season).unwrap_or(season);
            return Some(Resolution {
                season,
                episodes: resolved,
            });
        }
    }

    if parsed.is_anime && !parsed.absolute_numbers.is_empty() {
        let matched: Vec<EpisodeRef> = episodes
            .iter()
            .filter(|ep| {
                ep.anime
                    && ep
                        .effective_absolute()
                        .is_some_and(|abs| parsed.absolute_numbers.contains(&abs))
            })
            .map(WantedEpisode::episode_ref)
            .collect();
        if let Some(first) = matched.first() {
            return Some(Resolution {
                season: first.season,
                episodes: matched,
            });
        }
    }

    debug!(title = title, "Result does not match an episode we are searching for, skipping it");
    None
}

/// Numbering for a row the pass did not accept.
///
/// Scene numbers are mapped back through the requested episodes; titles
/// that cannot be fully mapped are stored as unknown.
fn skipped_numbering(parsed: &ParsedRelease, episodes: &[WantedEpisode]) -> RowNumbering {
    if !parsed.scene_numbered {
        return RowNumbering::Parsed;
    }
    let Some(season) = parsed.season_number else {
        return RowNumbering::Unknown;
    };

    let mapped: Option<Vec<EpisodeRef>> = parsed
        .episode_numbers
        .iter()
        .map(|n| {
            episodes
                .iter()
                .find(|ep| {
                    ep.show_id == parsed.show_id
                        && ep.scene_season == season
                        && ep.scene_episode == *n
                })
                .map(WantedEpisode::episode_ref)
        })
        .collect();

    match mapped.as_deref() {
        Some([first, rest @ ..]) if rest.iter().all(|ep| ep.season == first.season) => {
            RowNumbering::Canonical(
                first.season,
                std::iter::once(first)
                    .chain(rest)
                    .map(|ep| ep.episode)
                    .collect(),
            )
        }
        _ => RowNumbering::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{Quality, QualityTier};

    fn parsed(season: Option<u32>, episodes: Vec<u32>) -> ParsedRelease {
        ParsedRelease {
            show_id: 1,
            series_name: "Show".to_string(),
            season_number: season,
            episode_numbers: episodes,
            absolute_numbers: vec![],
            quality: Quality::Known(QualityTier::Hdtv),
            release_group: None,
            version: None,
            air_date: None,
            is_anime: false,
            scene_numbered: false,
        }
    }

    fn wanted(season: u32, episode: u32) -> WantedEpisode {
        WantedEpisode::new(&ShowInfo::new(1, "Show"), season, episode)
    }

    #[test]
    fn test_normalize_title_and_url() {
        assert_eq!(normalize_title("Show S01E01 720p"), "Show.S01E01.720p");
        assert_eq!(
            normalize_url("magnet:?xt=urn:btih:abc&amp;dn=x%26tr%3Dudp://t"),
            "magnet:?xt=urn:btih:abc&dn=x&tr=udp://t"
        );
    }

    #[test]
    fn test_threshold_keeps_unknown_counts() {
        let config = SearchConfig {
            min_seeders: 5,
            min_leechers: 1,
            ..Default::default()
        };
        assert!(meets_threshold(&RawHit::new("a", "b"), &config));
        assert!(meets_threshold(&RawHit::new("a", "b").with_peers(5, 1), &config));
        assert!(!meets_threshold(&RawHit::new("a", "b").with_peers(4, 10), &config));
        assert!(!meets_threshold(&RawHit::new("a", "b").with_peers(10, 0), &config));
    }

    #[test]
    fn test_season_pack_resolution() {
        let episodes = vec![wanted(2, 1), wanted(2, 2)];

        let pack = resolve_season_pack(&parsed(Some(2), vec![]), &episodes, "t").unwrap();
        assert_eq!(pack.season, 2);
        assert!(pack.episodes.is_empty());

        assert!(resolve_season_pack(&parsed(Some(2), vec![1]), &episodes, "t").is_none());
        assert!(resolve_season_pack(&parsed(Some(3), vec![]), &episodes, "t").is_none());
        assert!(resolve_season_pack(&parsed(None, vec![]), &episodes, "t").is_none());
    }

    #[test]
    fn test_episode_resolution_maps_scene_numbers() {
        let mut show = ShowInfo::new(1, "Show");
        show.is_scene = true;
        let episodes = vec![WantedEpisode::new(&show, 1, 13).with_scene(2, 1)];

        let resolved = resolve_episodes(&parsed(Some(2), vec![1]), &episodes, "t").unwrap();
        assert_eq!(resolved.season, 1);
        assert_eq!(resolved.episodes, vec![EpisodeRef::new(1, 13)]);

        assert!(resolve_episodes(&parsed(Some(1), vec![13]), &episodes, "t").is_none());
    }

    #[test]
    fn test_multi_episode_resolution_keeps_unrequested_numbers() {
        let episodes = vec![wanted(1, 1)];
        let resolved = resolve_episodes(&parsed(Some(1), vec![1, 2]), &episodes, "t").unwrap();
        assert_eq!(
            resolved.episodes,
            vec![EpisodeRef::new(1, 1), EpisodeRef::new(1, 2)]
        );
    }

    fn scene_show() -> ShowInfo {
        let mut show = ShowInfo::new(1, "Show");
        show.is_scene = true;
        show
    }

    fn scene_parsed(season: Option<u32>, episodes: Vec<u32>) -> ParsedRelease {
        ParsedRelease {
            scene_numbered: true,
            ..parsed(season, episodes)
        }
    }

    #[test]
    fn test_scene_season_pack_resolves_to_canonical_season() {
        let episodes = vec![WantedEpisode::new(&scene_show(), 1, 13).with_scene(2, 1)];

        let pack = resolve_season_pack(&scene_parsed(Some(2), vec![]), &episodes, "t").unwrap();
        assert_eq!(pack.season, 1);
        assert_eq!(pack.cache_numbering(), RowNumbering::Canonical(1, vec![]));

        assert!(resolve_season_pack(&scene_parsed(Some(1), vec![]), &episodes, "t").is_none());
    }

    #[test]
    fn test_scene_multi_episode_with_unmapped_number_is_skipped() {
        let episodes = vec![WantedEpisode::new(&scene_show(), 1, 13).with_scene(2, 1)];
        assert!(resolve_episodes(&scene_parsed(Some(2), vec![1, 2]), &episodes, "t").is_none());
    }

    #[test]
    fn test_skipped_numbering() {
        let show = scene_show();
        let episodes = vec![
            WantedEpisode::new(&show, 1, 13).with_scene(2, 1),
            WantedEpisode::new(&show, 1, 14).with_scene(2, 2),
            WantedEpisode::new(&show, 2, 1).with_scene(2, 3),
        ];

        assert_eq!(
            skipped_numbering(&parsed(Some(2), vec![5]), &episodes),
            RowNumbering::Parsed
        );
        assert_eq!(
            skipped_numbering(&scene_parsed(Some(2), vec![1, 2]), &episodes),
            RowNumbering::Canonical(1, vec![13, 14])
        );
        // Canonical seasons differ
        assert_eq!(
            skipped_numbering(&scene_parsed(Some(2), vec![2, 3]), &episodes),
            RowNumbering::Unknown
        );
        assert_eq!(
            skipped_numbering(&scene_parsed(Some(2), vec![4]), &episodes),
            RowNumbering::Unknown
        );
        assert_eq!(
            skipped_numbering(&scene_parsed(Some(2), vec![]), &episodes),
            RowNumbering::Unknown
        );
        assert_eq!(
            skipped_numbering(&scene_parsed(None, vec![]), &episodes),
            RowNumbering::Unknown
        );
    }
}
