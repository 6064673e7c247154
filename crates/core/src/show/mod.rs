//! Show and episode metadata as seen by the reconciliation engine.
//!
//! Show metadata is owned elsewhere; the engine only needs the
//! [`EpisodeDirectory`] seam to resolve air dates and ask whether an
//! episode is still wanted at a given quality.

mod directory;
mod types;

pub use directory::InMemoryEpisodeDirectory;
pub use types::*;

use chrono::NaiveDate;

use crate::quality::Quality;

/// Read-only view over a show library.
pub trait EpisodeDirectory: Send + Sync {
    /// All episodes of `show_id` that aired on `air_date`, in library order.
    fn episodes_on_air_date(&self, show_id: u64, air_date: NaiveDate) -> Vec<EpisodeRef>;

    /// Whether `episode` should be downloaded at `quality`.
    fn wanted(
        &self,
        show_id: u64,
        episode: EpisodeRef,
        quality: Quality,
        manual_search: bool,
        download_current_quality: bool,
    ) -> bool;
}
