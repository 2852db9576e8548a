//! Change detection and announcement item extraction
//!
//! Pure functions: given a freshly fetched snapshot and the cached watermark,
//! decide whether a broadcast-worthy transition occurred and which entities to
//! announce. No I/O, fully deterministic, order-independent of input.

use crate::model::{AnnouncementItem, Entity, ResetSnapshot, Watermark};
use std::collections::HashSet;

/// Whether `candidate` represents a reset that has not been announced yet
///
/// True when no watermark was cached (cold start) or the candidate differs
/// from the cached value.
pub fn has_changed(candidate: Watermark, cached: Option<Watermark>) -> bool {
    match cached {
        None => true,
        Some(cached) => candidate != cached,
    }
}

/// Extract the announce-worthy entities from a snapshot
///
/// Scans every location with at least one loot entry, keeps entities whose
/// rarity equals `tier`, substitutes an entity's schematic output item when
/// present, deduplicates by entity id (first occurrence wins), and returns the
/// result sorted by display name, case-insensitive ascending, with empty
/// names first. The output is identical under any permutation of the input
/// locations or loot entries carrying the same entity set.
pub fn extract_announcement_items(snapshot: &ResetSnapshot, tier: u8) -> Vec<AnnouncementItem> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut items: Vec<AnnouncementItem> = Vec::new();

    for location in snapshot.locations.iter().filter(|loc| !loc.loot.is_empty()) {
        for entry in &location.loot {
            let Some(entity) = entry.entity.as_ref() else {
                continue;
            };
            if entity.tier != Some(tier) {
                continue;
            }
            let Some(id) = entity.id.as_deref() else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }

            // A schematic announces the item it produces, not itself
            let announced: &Entity = entity
                .schematic_output_item
                .as_deref()
                .unwrap_or(entity);

            items.push(AnnouncementItem {
                id: announced.id.clone().unwrap_or_else(|| id.to_string()),
                name: announced.name.clone().unwrap_or_default(),
                category_id: announced.main_category_id.clone(),
            });
        }
    }

    items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    items
}
