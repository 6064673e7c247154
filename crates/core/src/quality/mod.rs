//! Release quality classification and quality-based ordering.

mod classifier;
mod ordering;
mod types;

pub use classifier::SceneQualityClassifier;
pub use ordering::order_by_quality;
pub use types::*;

/// Maps a raw release title to a quality.
pub trait QualityClassifier: Send + Sync {
    /// Classify a title. `anime` enables anime-specific markers.
    fn classify(&self, title: &str, anime: bool) -> Quality;
}
