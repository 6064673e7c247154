//! Quality-based ordering of merged search hits.

use std::collections::BTreeMap;

use super::{Quality, QualityTier};

/// Group items by quality tier and flatten them best tier first.
///
/// Items classified as [`Quality::None`] are removed. Items classified as
/// [`Quality::Unknown`] are appended after every known tier, in their
/// original order. Order within a tier is preserved.
pub fn order_by_quality<T, F>(items: Vec<T>, mut classify: F) -> Vec<(T, Quality)>
where
    F: FnMut(&T) -> Quality,
{
    let mut by_tier: BTreeMap<QualityTier, Vec<T>> = BTreeMap::new();
    let mut unknown: Vec<T> = Vec::new();

    for item in items {
        match classify(&item) {
            Quality::Known(tier) => by_tier.entry(tier).or_default().push(item),
            Quality::Unknown => unknown.push(item),
            Quality::None => {}
        }
    }

    by_tier
        .into_iter()
        .rev()
        .flat_map(|(tier, items)| {
            items
                .into_iter()
                .map(move |item| (item, Quality::Known(tier)))
        })
        .chain(unknown.into_iter().map(|item| (item, Quality::Unknown)))
        .collect()
}
