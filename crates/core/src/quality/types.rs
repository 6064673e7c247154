//! Quality tiers for release classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known quality tiers, ordered from lowest to highest.
///
/// The derived `Ord` follows declaration order, so sorting descending puts
/// the best releases first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Sdtv,
    Sddvd,
    Hdtv,
    RawHdtv,
    FullHdtv,
    HdWebdl,
    FullHdWebdl,
    HdBluray,
    FullHdBluray,
    Uhd4kTv,
    Uhd4kWebdl,
    Uhd4kBluray,
}

impl QualityTier {
    /// Every tier, lowest first.
    pub const ALL: [QualityTier; 12] = [
        QualityTier::Sdtv,
        QualityTier::Sddvd,
        QualityTier::Hdtv,
        QualityTier::RawHdtv,
        QualityTier::FullHdtv,
        QualityTier::HdWebdl,
        QualityTier::FullHdWebdl,
        QualityTier::HdBluray,
        QualityTier::FullHdBluray,
        QualityTier::Uhd4kTv,
        QualityTier::Uhd4kWebdl,
        QualityTier::Uhd4kBluray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Sdtv => "sdtv",
            QualityTier::Sddvd => "sddvd",
            QualityTier::Hdtv => "hdtv",
            QualityTier::RawHdtv => "raw_hdtv",
            QualityTier::FullHdtv => "full_hdtv",
            QualityTier::HdWebdl => "hd_webdl",
            QualityTier::FullHdWebdl => "full_hd_webdl",
            QualityTier::HdBluray => "hd_bluray",
            QualityTier::FullHdBluray => "full_hd_bluray",
            QualityTier::Uhd4kTv => "uhd4k_tv",
            QualityTier::Uhd4kWebdl => "uhd4k_webdl",
            QualityTier::Uhd4kBluray => "uhd4k_bluray",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Result of classifying a release title.
///
/// `None` is a hard exclusion (the configuration forbids the format),
/// `Unknown` means the title carried no recognizable quality markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tier")]
pub enum Quality {
    None,
    Known(QualityTier),
    Unknown,
}

impl Quality {
    pub fn tier(&self) -> Option<QualityTier> {
        match self {
            Quality::Known(tier) => Some(*tier),
            _ => None,
        }
    }

    /// Stable string form used by the cache table.
    pub fn to_db_string(&self) -> String {
        match self {
            Quality::None => "none".to_string(),
            Quality::Unknown => "unknown".to_string(),
            Quality::Known(tier) => tier.as_str().to_string(),
        }
    }

    pub fn from_db_string(s: &str) -> Self {
        match s {
            "none" => Quality::None,
            other => QualityTier::from_str_opt(other)
                .map(Quality::Known)
                .unwrap_or(Quality::Unknown),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(QualityTier::Sdtv < QualityTier::Hdtv);
        assert!(QualityTier::Hdtv < QualityTier::FullHdWebdl);
        assert!(QualityTier::FullHdBluray < QualityTier::Uhd4kTv);
        let mut sorted = QualityTier::ALL;
        sorted.sort();
        assert_eq!(sorted, QualityTier::ALL);
    }

    #[test]
    fn test_db_string_round_trip_for_sentinels() {
        assert_eq!(Quality::from_db_string("none"), Quality::None);
        assert_eq!(Quality::from_db_string("unknown"), Quality::Unknown);
        assert_eq!(Quality::from_db_string("garbage"), Quality::Unknown);
        assert_eq!(
            Quality::from_db_string("full_hd_webdl"),
            Quality::Known(QualityTier::FullHdWebdl)
        );
    }

    #[test]
    fn test_quality_serialization() {
        let json = serde_json::to_string(&Quality::Known(QualityTier::Hdtv)).unwrap();
        assert_eq!(json, r#"{"kind":"known","tier":"hdtv"}"#);
        assert_eq!(
            serde_json::to_string(&Quality::Unknown).unwrap(),
            r#"{"kind":"unknown"}"#
        );
    }
}
