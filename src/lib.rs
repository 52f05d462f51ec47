//! # Cube Stats
//!
//! Draft history analytics for a Magic: The Gathering cube.
//!
//! ## Architecture
//!
//! - **models**: Cards, decks, games and matches, color identities
//! - **storage**: Deck corpus loading, derived metrics and the cache
//! - **query**: The deck and card filter language
//! - **buckets**: Chronological draft windows for trend data
//! - **calculate**: Card, color, archetype, player and synergy statistics
//! - **config**: Configuration loading and validation

pub mod buckets;
pub mod calculate;
pub mod config;
pub mod models;
pub mod query;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
