//! Release title parsing.

mod scene;
mod types;

pub use scene::{normalize_name, SceneNameParser};
pub use types::*;

/// Parses release titles into structured releases.
pub trait TitleParser: Send + Sync {
    /// Parse `title`. `anime` enables absolute-number patterns.
    fn parse(&self, title: &str, anime: bool) -> Result<ParsedRelease, NameParseError>;
}
