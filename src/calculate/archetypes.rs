//! Archetype (deck label) performance.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::{calculate_percent, calculate_win_percent, mean, respond, round2, total_wins, Bucketing, StatsResponse};
use crate::models::MACRO_ARCHETYPES;
use crate::storage::CorpusDeck;

/// Macro labels that never show up in another label's `shared_with`.
const UNSHARED: [&str; 3] = ["aggro", "midrange", "control"];

/// Statistics for one label.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchetypeStats {
    #[serde(rename = "type")]
    pub label: String,

    /// Decks carrying the label
    pub count: u32,

    pub wins: u32,
    pub losses: u32,
    pub trophies: u32,
    pub last_place: u32,

    /// Decks with a winning match record
    pub winning: u32,

    /// Decks with a losing match record
    pub losing: u32,

    pub build_percent: f64,
    pub win_percent: f64,
    pub percent_of_wins: f64,

    /// Mean mana value of non-land mainboard cards, averaged per deck
    pub avg_cmc: f64,

    /// Other labels seen on the same decks
    pub shared_with: BTreeMap<String, u32>,

    /// Average number of co-labels per deck
    pub avg_shared: f64,

    pub players: BTreeMap<String, u32>,
}

impl ArchetypeStats {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchetypeSet {
    pub archetypes: BTreeMap<String, ArchetypeStats>,

    /// Sum of game wins, counting each game once
    pub total_games: u32,
}

fn average_cmc(deck: &CorpusDeck) -> Option<f64> {
    let cmcs: Vec<f64> = deck
        .deck
        .mainboard
        .iter()
        .filter(|c| !c.is_land())
        .map(|c| f64::from(c.cmc))
        .collect();
    mean(&cmcs)
}

/// Accumulate and post-process label statistics over one deck list.
pub fn archetype_set(decks: &[Arc<CorpusDeck>]) -> ArchetypeSet {
    let mut archetypes: BTreeMap<String, ArchetypeStats> = MACRO_ARCHETYPES
        .iter()
        .map(|m| (m.to_string(), ArchetypeStats::new(m)))
        .collect();
    // Summed per-deck means, divided by count afterwards.
    let mut cmc_sums: BTreeMap<String, f64> = BTreeMap::new();

    for deck in decks {
        let deck_cmc = average_cmc(deck);

        for label in &deck.deck.labels {
            let stats = archetypes
                .entry(label.clone())
                .or_insert_with(|| ArchetypeStats::new(label));
            stats.count += 1;
            stats.wins += deck.stats.game_wins;
            stats.losses += deck.stats.game_losses;
            stats.trophies += deck.stats.trophies;
            stats.last_place += deck.stats.last_place;
            stats.winning += deck.stats.top_half;
            stats.losing += deck.stats.bottom_half;
            *stats.players.entry(deck.player().to_string()).or_default() += 1;

            for other in &deck.deck.labels {
                if other == label || UNSHARED.contains(&other.as_str()) {
                    continue;
                }
                *stats.shared_with.entry(other.clone()).or_default() += 1;
            }

            if let Some(cmc) = deck_cmc {
                *cmc_sums.entry(label.clone()).or_default() += cmc;
            }
        }
    }

    let all_wins = total_wins(decks);
    for (label, stats) in archetypes.iter_mut() {
        stats.build_percent = calculate_percent(f64::from(stats.count), decks.len() as f64);
        stats.win_percent = calculate_win_percent(stats.wins, stats.losses);
        stats.percent_of_wins = calculate_percent(f64::from(stats.wins), f64::from(all_wins));
        if stats.count > 0 {
            let count = f64::from(stats.count);
            stats.avg_cmc = round2(cmc_sums.get(label).copied().unwrap_or(0.0) / count);
            let shared: u32 = stats.shared_with.values().sum();
            stats.avg_shared = round2(f64::from(shared) / count);
        }
    }

    ArchetypeSet {
        archetypes,
        total_games: all_wins,
    }
}

/// Archetype statistics, bucketed when requested.
pub fn archetype_stats(decks: &[Arc<CorpusDeck>], bucketing: Bucketing) -> StatsResponse<ArchetypeSet> {
    respond(decks, bucketing, archetype_set)
}
