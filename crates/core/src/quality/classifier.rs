//! Scene-title quality classification.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashSet;

use super::{Quality, QualityClassifier, QualityTier};

static HEVC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z0-9])(?:hevc|[hx]\.?265)(?:[^a-z0-9]|$)").unwrap());

static ANIME_RESOLUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:1920|1440)x1080|1280x720|3840x2160").unwrap());

/// Classifies titles by the tokens release groups put in them.
#[derive(Debug, Clone)]
pub struct SceneQualityClassifier {
    allow_hevc: bool,
}

impl Default for SceneQualityClassifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SceneQualityClassifier {
    pub fn new(allow_hevc: bool) -> Self {
        Self { allow_hevc }
    }
}

impl QualityClassifier for SceneQualityClassifier {
    fn classify(&self, title: &str, anime: bool) -> Quality {
        if title.is_empty() {
            return Quality::Unknown;
        }

        if !self.allow_hevc && HEVC.is_match(title) {
            return Quality::None;
        }

        let lower = title.to_lowercase();
        let mut tokens: HashSet<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        if anime {
            if let Some(m) = ANIME_RESOLUTION.find(&lower) {
                match m.as_str() {
                    "1280x720" => tokens.insert("720p"),
                    "3840x2160" => tokens.insert("2160p"),
                    _ => tokens.insert("1080p"),
                };
            }
        }

        let has = |t: &str| tokens.contains(t);

        let bluray = has("bluray")
            || has("bdrip")
            || has("brrip")
            || has("bdremux")
            || (has("blu") && has("ray"))
            || (anime && has("bd"));
        let web = has("web") || has("webdl") || has("webrip") || has("amzn") || has("nf");
        let hdtv = has("hdtv") || has("pdtv") || has("dsr") || has("tvrip");

        let tier = if has("2160p") || has("4k") || has("uhd") {
            Some(if bluray {
                QualityTier::Uhd4kBluray
            } else if web {
                QualityTier::Uhd4kWebdl
            } else {
                QualityTier::Uhd4kTv
            })
        } else if has("1080p") {
            Some(if bluray {
                QualityTier::FullHdBluray
            } else if web {
                QualityTier::FullHdWebdl
            } else {
                QualityTier::FullHdtv
            })
        } else if has("1080i") || has("mpeg2") {
            Some(QualityTier::RawHdtv)
        } else if has("720p") {
            Some(if bluray {
                QualityTier::HdBluray
            } else if web {
                QualityTier::HdWebdl
            } else {
                QualityTier::Hdtv
            })
        } else if has("dvdrip") || has("dvd") || bluray {
            Some(QualityTier::Sddvd)
        } else if hdtv || web || has("xvid") || has("divx") || has("480p") || has("sdtv") {
            Some(QualityTier::Sdtv)
        } else {
            None
        };

        tier.map(Quality::Known).unwrap_or(Quality::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(title: &str) -> Quality {
        SceneQualityClassifier::default().classify(title, false)
    }

    #[test]
    fn test_classify_hd_tiers() {
        assert_eq!(classify("Show.S01E01.720p"), Quality::Known(QualityTier::Hdtv));
        assert_eq!(
            classify("Show.S01E01.720p.HDTV.x264-GRP"),
            Quality::Known(QualityTier::Hdtv)
        );
        assert_eq!(
            classify("Show.S01E01.1080p.WEB-DL.DD5.1.H.264-GRP"),
            Quality::Known(QualityTier::FullHdWebdl)
        );
        assert_eq!(
            classify("Show.S01E01.720p.BluRay.x264-GRP"),
            Quality::Known(QualityTier::HdBluray)
        );
        assert_eq!(
            classify("Show.S01E01.2160p.WEB.h265-GRP"),
            Quality::Known(QualityTier::Uhd4kWebdl)
        );
        assert_eq!(
            classify("Show.S01E01.1080i.HDTV.MPEG2-GRP"),
            Quality::Known(QualityTier::RawHdtv)
        );
    }

    #[test]
    fn test_classify_sd_tiers() {
        assert_eq!(
            classify("Show.S01E01.HDTV.XviD-GRP"),
            Quality::Known(QualityTier::Sdtv)
        );
        assert_eq!(
            classify("Show.S01E01.DVDRip.XviD-GRP"),
            Quality::Known(QualityTier::Sddvd)
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("Show.S01.Complete"), Quality::Unknown);
        assert_eq!(classify(""), Quality::Unknown);
    }

    #[test]
    fn test_hevc_excluded_when_not_allowed() {
        let strict = SceneQualityClassifier::new(false);
        assert_eq!(
            strict.classify("Show.S01E01.1080p.WEB.x265-GRP", false),
            Quality::None
        );
        assert_eq!(
            strict.classify("Show.S01E01.1080p.HEVC-GRP", false),
            Quality::None
        );
        assert_eq!(
            strict.classify("Show.S01E01.1080p.WEB.x264-GRP", false),
            Quality::Known(QualityTier::FullHdWebdl)
        );
    }

    #[test]
    fn test_anime_resolution_and_bd_tokens() {
        let classifier = SceneQualityClassifier::default();
        assert_eq!(
            classifier.classify("[Group].Show.-.045.[BD.1920x1080]", true),
            Quality::Known(QualityTier::FullHdBluray)
        );
        assert_eq!(
            classifier.classify("[Group].Show.-.045.[1280x720]", true),
            Quality::Known(QualityTier::Hdtv)
        );
    }
}
