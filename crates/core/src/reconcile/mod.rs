//! Search-result reconciliation.
//!
//! Turns raw hits from any number of sources into download candidates
//! grouped per episode, multi-episode and full-season bucket.

mod engine;
mod search_strings;
mod types;

pub use engine::{normalize_title, normalize_url, Reconciler};
pub use search_strings::{
    episode_search_strings, season_search_strings, NamingPattern, SeasonDedupe,
};
pub use types::*;
