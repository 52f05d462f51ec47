//! Pairwise card co-occurrence.
//!
//! A pair's synergy score is how often two cards share a mainboard relative
//! to how often they would if each were played independently. A score of 1.0
//! means no association; above 1.0 the cards are played together more than
//! chance predicts.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::CardCatalog;
use crate::storage::CorpusDeck;

/// Largest number of pairs in a response.
pub const MAX_PAIRS: usize = 100;

fn default_min_decks() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyStatsRequest {
    /// Pairs seen together in fewer decks are dropped
    #[serde(default = "default_min_decks")]
    pub min_decks: u32,
}

impl Default for SynergyStatsRequest {
    fn default() -> Self {
        Self {
            min_decks: default_min_decks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynergyPair {
    pub card1: String,
    pub card2: String,

    /// Decks that mainboarded both cards
    pub count: u32,

    pub synergy_score: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SynergySet {
    pub total_decks: usize,
    pub pairs: Vec<SynergyPair>,
}

/// Strongest pairs first, then most common, then by name for stability.
fn rank(a: &SynergyPair, b: &SynergyPair) -> Ordering {
    b.synergy_score
        .partial_cmp(&a.synergy_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.card1.cmp(&b.card1))
        .then_with(|| a.card2.cmp(&b.card2))
}

/// Score every pair of non-land catalog cards that share a mainboard.
pub fn synergy_stats(
    decks: &[Arc<CorpusDeck>],
    catalog: &CardCatalog,
    request: &SynergyStatsRequest,
) -> SynergySet {
    let mut card_counts: HashMap<&str, u32> = HashMap::new();
    let mut pair_counts: HashMap<(&str, &str), u32> = HashMap::new();

    for deck in decks {
        // Sorted and de-duplicated, so each pair is keyed (lower, higher).
        let names: BTreeSet<&str> = deck
            .deck
            .mainboard
            .iter()
            .filter(|c| catalog.get(&c.name).is_some_and(|card| !card.is_land()))
            .map(|c| c.name.as_str())
            .collect();
        let names: Vec<&str> = names.into_iter().collect();

        for &name in &names {
            *card_counts.entry(name).or_default() += 1;
        }
        for (i, &a) in names.iter().enumerate() {
            for &b in &names[i + 1..] {
                *pair_counts.entry((a, b)).or_default() += 1;
            }
        }
    }

    let total = decks.len() as f64;
    let mut pairs: Vec<SynergyPair> = pair_counts
        .into_iter()
        .filter(|(_, count)| *count >= request.min_decks)
        .map(|((a, b), count)| {
            let p_a = f64::from(card_counts[a]) / total;
            let p_b = f64::from(card_counts[b]) / total;
            let expected = p_a * p_b * total;
            SynergyPair {
                card1: a.to_string(),
                card2: b.to_string(),
                count,
                synergy_score: f64::from(count) / expected,
            }
        })
        .collect();

    pairs.sort_by(rank);
    pairs.truncate(MAX_PAIRS);
    tracing::debug!("Scored {} synergy pairs over {} decks", pairs.len(), decks.len());

    SynergySet {
        total_decks: decks.len(),
        pairs,
    }
}
