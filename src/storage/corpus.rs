//! The loaded deck corpus and its derived per-deck metrics.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::models::{Card, Deck, DeckStats, GameResult};
use crate::query::Searchable;

/// A deck plus everything computed about it at load time.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusDeck {
    #[serde(flatten)]
    pub deck: Deck,

    pub stats: DeckStats,

    /// Average win rate of this deck's opponents, excluding games against this deck
    pub opponent_win_percentage: f64,

    /// Number of decks in this deck's draft
    pub draft_size: usize,

    #[serde(rename = "deck_colors")]
    pub colors: Vec<String>,

    pub color_identities: BTreeSet<String>,
}

impl CorpusDeck {
    pub fn new(deck: Deck, draft_size: usize) -> Self {
        let stats = DeckStats::from_deck(&deck);
        let colors = deck.colors();
        let color_identities = deck.color_identities();
        Self {
            deck,
            stats,
            opponent_win_percentage: 0.0,
            draft_size,
            colors,
            color_identities,
        }
    }

    pub fn player(&self) -> &str {
        &self.deck.player
    }

    pub fn draft_id(&self) -> &str {
        self.deck.draft_id()
    }

    /// Total recorded games (the length of the games list).
    pub fn games_played(&self) -> usize {
        self.deck.games.len()
    }
}

impl Searchable for CorpusDeck {
    fn player(&self) -> &str {
        &self.deck.player
    }

    fn labels(&self) -> &[String] {
        &self.deck.labels
    }

    fn draft_size(&self) -> usize {
        self.draft_size
    }

    fn deck_colors(&self) -> &[String] {
        &self.colors
    }

    fn cards(&self) -> Vec<&Card> {
        self.deck.all_cards().collect()
    }
}

/// An immutable, versioned snapshot of every loaded deck.
#[derive(Debug)]
pub struct Corpus {
    version: u64,
    loaded_at: DateTime<Utc>,
    decks: Vec<Arc<CorpusDeck>>,
    lookup: HashMap<(String, String), usize>,
}

type DeckKey = (String, String);

fn key_for(deck: &CorpusDeck) -> DeckKey {
    (deck.player().to_string(), deck.draft_id().to_string())
}

impl Corpus {
    /// Build a snapshot, computing strength of schedule for every deck.
    pub fn build(mut decks: Vec<CorpusDeck>, version: u64) -> Self {
        let lookup: HashMap<DeckKey, usize> = decks
            .iter()
            .enumerate()
            .map(|(i, d)| (key_for(d), i))
            .collect();

        let owps: Vec<f64> = decks
            .iter()
            .map(|d| opponent_win_percentage(d, &decks, &lookup))
            .collect();
        for (deck, owp) in decks.iter_mut().zip(owps) {
            deck.opponent_win_percentage = owp;
        }

        Self {
            version,
            loaded_at: Utc::now(),
            decks: decks.into_iter().map(Arc::new).collect(),
            lookup,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Decks in load order.
    pub fn decks(&self) -> &[Arc<CorpusDeck>] {
        &self.decks
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Look up a player's deck from a given draft.
    pub fn find(&self, player: &str, draft_id: &str) -> Option<&Arc<CorpusDeck>> {
        self.lookup
            .get(&(player.to_string(), draft_id.to_string()))
            .map(|&i| &self.decks[i])
    }
}

/// Mean of per-opponent win rates, each excluding games against this deck's player.
///
/// Opponents whose deck is missing, or who played no other games, contribute
/// nothing. Rounded to a whole percent; 0 when there is nothing to average.
fn opponent_win_percentage(
    deck: &CorpusDeck,
    decks: &[CorpusDeck],
    lookup: &HashMap<DeckKey, usize>,
) -> f64 {
    let player = deck.player();
    let draft = deck.draft_id();
    let mut ratios = Vec::new();

    for m in &deck.deck.matches {
        let key = (m.opponent.clone(), draft.to_string());
        let Some(&idx) = lookup.get(&key) else {
            warn!(
                "No deck found for opponent {} in draft {} (player {})",
                m.opponent, draft, player
            );
            continue;
        };
        let opponent = &decks[idx];

        let mut games = 0u32;
        let mut wins = 0u32;
        for g in opponent.deck.games.iter().filter(|g| g.opponent != player) {
            games += 1;
            if g.result(&m.opponent) == GameResult::Win {
                wins += 1;
            }
        }
        if games > 0 {
            ratios.push(wins as f64 / games as f64);
        }
    }

    if ratios.is_empty() {
        return 0.0;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    (100.0 * mean).round()
}
