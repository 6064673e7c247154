//! Source adapter abstraction.
//!
//! A `SourceAdapter` turns a bucket of search strings into raw hits from
//! one indexer site or aggregator. Adapters know nothing about episodes
//! beyond the strings they are handed.

mod jackett;
mod magnet;
mod registry;
mod types;

pub use jackett::JackettAdapter;
pub use magnet::{hash_from_magnet, name_from_magnet};
pub use registry::AdapterRegistry;
pub use types::*;
