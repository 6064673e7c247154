//! Magnet link helpers.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

static BTIH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"urn:btih:([A-Za-z0-9]{32,40})").unwrap());

static DISPLAY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"dn=([^&]+)").unwrap());

/// Extract the info hash of a magnet link as uppercase hex.
///
/// Accepts both 40-character hex and 32-character base32 hashes.
pub fn hash_from_magnet(magnet: &str) -> Option<String> {
    let hash = BTIH.captures(magnet)?.get(1)?.as_str().to_uppercase();

    match hash.len() {
        40 if hash.chars().all(|c| c.is_ascii_hexdigit()) => Some(hash),
        32 => match base32_decode(&hash) {
            Some(bytes) => Some(bytes.iter().map(|b| format!("{:02X}", b)).collect()),
            None => {
                debug!(magnet = magnet, "Invalid base32 info hash");
                None
            }
        },
        _ => {
            debug!(magnet = magnet, "Unable to extract info hash from magnet");
            None
        }
    }
}

/// The `dn=` display name of a magnet link, if present.
pub fn name_from_magnet(magnet: &str) -> Option<String> {
    let raw = DISPLAY_NAME.captures(magnet)?.get(1)?.as_str();
    let raw = raw.replace('+', " ");
    Some(
        urlencoding::decode(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw),
    )
}

/// RFC 4648 base32 (uppercase, unpadded).
fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let mut bits: u64 = 0;
    let mut bit_count = 0u32;
    let mut out = Vec::with_capacity(input.len() * 5 / 8);

    for c in input.bytes() {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return None,
        };
        bits = (bits << 5) | value as u64;
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
            bits &= (1 << bit_count) - 1;
        }
    }

    Some(out)
}
