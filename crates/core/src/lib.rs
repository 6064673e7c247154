pub mod adapter;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod parser;
pub mod quality;
pub mod reconcile;
pub mod show;
pub mod testing;

pub use adapter::{
    hash_from_magnet, AdapterError, AdapterRegistry, JackettAdapter, RawHit, SearchStringKind,
    SearchStrings, SourceAdapter,
};
pub use cache::{CacheError, CacheRow, NameCache, SqliteNameCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, JackettConfig,
    SanitizedConfig, SearchConfig,
};
pub use parser::{NameParseError, ParsedRelease, SceneNameParser, TitleParser};
pub use quality::{Quality, QualityClassifier, QualityTier, SceneQualityClassifier};
pub use reconcile::{
    BucketKey, DownloadCandidate, NamingPattern, ReconcileError, Reconciler, SearchMode,
    SearchResults,
};
pub use show::{
    EpisodeDirectory, EpisodeRecord, EpisodeRef, EpisodeStatus, InMemoryEpisodeDirectory,
    QualityProfile, ShowInfo, ShowRecord, WantedEpisode,
};
