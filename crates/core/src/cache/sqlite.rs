//! SQLite-backed name-matching cache.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use super::types::{decode_episodes, encode_episodes};
use super::{CacheError, CacheRow, NameCache};
use crate::quality::Quality;
use crate::reconcile::DownloadCandidate;
use crate::show::{EpisodeDirectory, EpisodeRef, WantedEpisode};

const ROW_COLUMNS: &str = "show_id, title, url, season, episodes, quality, release_group, version, size, source, added_at";

/// SQLite-backed name cache.
pub struct SqliteNameCache {
    conn: Mutex<Connection>,
}

impl SqliteNameCache {
    /// Open (or create) the cache database at `path`.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            -- One row per observed release (title + url)
            CREATE TABLE IF NOT EXISTS name_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                show_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                season INTEGER,
                episodes TEXT NOT NULL,
                quality TEXT NOT NULL,
                release_group TEXT,
                version INTEGER,
                size INTEGER NOT NULL DEFAULT -1,
                source TEXT NOT NULL,
                added_at TEXT NOT NULL,
                UNIQUE(title, url)
            );

            CREATE INDEX IF NOT EXISTS idx_name_cache_show_season ON name_cache(show_id, season);
            CREATE INDEX IF NOT EXISTS idx_name_cache_added ON name_cache(added_at);
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn row_to_cache_row(row: &rusqlite::Row) -> rusqlite::Result<CacheRow> {
        let show_id: i64 = row.get(0)?;
        let season: Option<i64> = row.get(3)?;
        let episodes: String = row.get(4)?;
        let quality: String = row.get(5)?;
        let version: Option<i64> = row.get(7)?;
        let added_at_str: String = row.get(10)?;

        let added_at = DateTime::parse_from_rfc3339(&added_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(CacheRow {
            show_id: show_id as u64,
            title: row.get(1)?,
            url: row.get(2)?,
            season: season.map(|s| s as u32),
            episodes: decode_episodes(&episodes),
            quality: Quality::from_db_string(&quality),
            release_group: row.get(6)?,
            version: version.map(|v| v as u32),
            size: row.get(8)?,
            source: row.get(9)?,
            added_at,
        })
    }

    /// Number of rows in the cache.
    pub fn count(&self) -> Result<u64, CacheError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM name_cache", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// All rows cached for a show, oldest first.
    pub fn rows_for_show(&self, show_id: u64) -> Result<Vec<CacheRow>, CacheError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM name_cache WHERE show_id = ? ORDER BY id",
            ROW_COLUMNS
        ))?;
        let rows = stmt.query_map(params![show_id as i64], Self::row_to_cache_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

impl NameCache for SqliteNameCache {
    fn lookup(
        &self,
        episode: &WantedEpisode,
        directory: &dyn EpisodeDirectory,
        manual_search: bool,
        download_current_quality: bool,
    ) -> Result<Option<Vec<DownloadCandidate>>, CacheError> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM name_cache
                 WHERE show_id = ?1 AND season = ?2 AND episodes LIKE ?3
                 ORDER BY id",
                ROW_COLUMNS
            ))?;
            let pattern = format!("%|{}|%", episode.episode);
            let mapped = stmt.query_map(
                params![episode.show_id as i64, episode.season as i64, pattern],
                Self::row_to_cache_row,
            )?;

            let mut rows = Vec::new();
            for row in mapped {
                rows.push(row?);
            }
            rows
        };

        let mut candidates = Vec::new();
        for row in rows {
            let Some(season) = row.season else {
                continue;
            };
            let episodes: Vec<EpisodeRef> = row
                .episodes
                .iter()
                .map(|ep| EpisodeRef::new(season, *ep))
                .collect();

            let wanted = episodes.iter().all(|ep| {
                directory.wanted(
                    row.show_id,
                    *ep,
                    row.quality,
                    manual_search,
                    download_current_quality,
                )
            });
            if !wanted {
                debug!(title = %row.title, "Cached result no longer wanted");
                continue;
            }

            candidates.push(DownloadCandidate {
                show_id: row.show_id,
                episodes,
                url: row.url,
                title: row.title,
                quality: row.quality,
                release_group: row.release_group,
                version: row.version,
                size: row.size,
                source: row.source,
                from_cache: true,
            });
        }

        if candidates.is_empty() {
            Ok(None)
        } else {
            Ok(Some(candidates))
        }
    }

    fn insert_batch(&self, rows: &[CacheRow]) -> Result<usize, CacheError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO name_cache (show_id, title, url, season, episodes, quality, release_group, version, size, source, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(title, url) DO UPDATE SET
                    show_id = excluded.show_id,
                    season = excluded.season,
                    episodes = excluded.episodes,
                    quality = excluded.quality,
                    release_group = excluded.release_group,
                    version = excluded.version,
                    size = excluded.size,
                    source = excluded.source,
                    added_at = excluded.added_at",
            )?;

            for row in rows {
                stmt.execute(params![
                    row.show_id as i64,
                    &row.title,
                    &row.url,
                    row.season.map(|s| s as i64),
                    encode_episodes(&row.episodes),
                    row.quality.to_db_string(),
                    &row.release_group,
                    row.version.map(|v| v as i64),
                    row.size,
                    &row.source,
                    row.added_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;

        debug!(rows = rows.len(), "Cache batch written");
        Ok(rows.len())
    }

    fn list_propers(&self, since: DateTime<Utc>) -> Result<Vec<CacheRow>, CacheError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM name_cache
             WHERE added_at >= ?1
               AND (title LIKE '%.PROPER.%' OR title LIKE '%.REPACK.%' OR title LIKE '%.REAL.%')
             ORDER BY id",
            ROW_COLUMNS
        ))?;
        let rows = stmt.query_map(params![since.to_rfc3339()], Self::row_to_cache_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
