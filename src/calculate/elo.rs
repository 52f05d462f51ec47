//! Pairwise ELO-style card rating.
//!
//! Within each deck every non-land mainboard card "plays" every castable
//! non-land sideboard card. The mainboard card is scored as the winner, with
//! a win value that shrinks as the two cards become less directly comparable.
//! Rating changes accumulate over a deck and apply together at its end.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{can_cast_with, Card};
use crate::storage::CorpusDeck;

pub const INITIAL_RATING: f64 = 1200.0;
const K_FACTOR: f64 = 16.0;
const CMC_PENALTY: f64 = 0.025;
const COLOR_PENALTY: f64 = 0.05;
const CREATURE_PENALTY: f64 = 0.1;
const MIN_WIN_VALUE: f64 = 0.55;

#[derive(Debug, Clone, Copy)]
struct Rating {
    elo: f64,
    pending: f64,
}

impl Default for Rating {
    fn default() -> Self {
        Self {
            elo: INITIAL_RATING,
            pending: 0.0,
        }
    }
}

/// How strongly `chosen` beats `passed`, between 0.55 and 1.0.
pub fn win_value(chosen: &Card, passed: &Card) -> f64 {
    let mut value = 1.0;
    value -= CMC_PENALTY * f64::from((chosen.cmc - passed.cmc).abs());

    if !chosen.colors.is_empty() && !passed.colors.is_empty() {
        let same_colors = chosen.colors.iter().all(|c| passed.colors.contains(c))
            && passed.colors.iter().all(|c| chosen.colors.contains(c));
        if !same_colors {
            value -= COLOR_PENALTY;
        }
    }

    if chosen.is_creature() != passed.is_creature() {
        value -= CREATURE_PENALTY;
    }

    value.max(MIN_WIN_VALUE)
}

/// Expected score of a player rated `r1` against one rated `r2`.
fn expected_score(r1: f64, r2: f64) -> f64 {
    let q1 = 10f64.powf(r1 / 400.0);
    let q2 = 10f64.powf(r2 / 400.0);
    q1 / (q1 + q2)
}

/// Ratings for every mainboard and sideboard card seen, truncated to integers.
pub fn elo_ratings(decks: &[Arc<CorpusDeck>]) -> HashMap<String, i64> {
    let mut ratings: HashMap<String, Rating> = HashMap::new();
    for deck in decks {
        for card in deck.deck.mainboard.iter().chain(deck.deck.sideboard.iter()) {
            ratings.entry(card.name.clone()).or_default();
        }
    }

    for deck in decks {
        let chosen: Vec<&Card> = deck.deck.mainboard.iter().filter(|c| !c.is_land()).collect();
        let passed: Vec<&Card> = deck
            .deck
            .sideboard
            .iter()
            .filter(|c| !c.is_land() && can_cast_with(&deck.colors, c))
            .collect();

        for c1 in &chosen {
            for c2 in &passed {
                let s1 = win_value(c1, c2);
                let r1 = ratings[&c1.name].elo;
                let r2 = ratings[&c2.name].elo;
                let e1 = expected_score(r1, r2);
                let e2 = expected_score(r2, r1);

                if let Some(r) = ratings.get_mut(&c1.name) {
                    r.pending += K_FACTOR * (s1 - e1);
                }
                if let Some(r) = ratings.get_mut(&c2.name) {
                    r.pending += K_FACTOR * ((1.0 - s1) - e2);
                }
            }
        }

        for card in deck.deck.mainboard.iter().chain(deck.deck.sideboard.iter()) {
            if let Some(r) = ratings.get_mut(&card.name) {
                r.elo += r.pending.round();
                r.pending = 0.0;
            }
        }
    }

    ratings
        .into_iter()
        .map(|(name, r)| (name, r.elo as i64))
        .collect()
}
