//! Derived statistics models shared by the deck corpus and the aggregators.

use serde::{Deserialize, Serialize};

use super::Deck;

/// Metrics derived once per deck when the corpus loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
    pub match_wins: u32,
    pub match_losses: u32,
    pub match_draws: u32,
    pub game_wins: u32,
    pub game_losses: u32,
    pub game_draws: u32,
    pub trophies: u32,
    pub last_place: u32,
    pub top_half: u32,
    pub bottom_half: u32,
}

impl DeckStats {
    pub fn from_deck(deck: &Deck) -> Self {
        Self {
            match_wins: deck.match_wins(),
            match_losses: deck.match_losses(),
            match_draws: deck.match_draws(),
            game_wins: deck.game_wins(),
            game_losses: deck.game_losses(),
            game_draws: deck.game_draws(),
            trophies: deck.trophies(),
            last_place: deck.last_place(),
            top_half: deck.top_half(),
            bottom_half: deck.bottom_half(),
        }
    }
}

/// Win/loss roll-up over a group of decks (a color, a label, a player).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    /// Game wins
    pub wins: u32,

    /// Game losses
    pub losses: u32,

    pub trophies: u32,
    pub last_place: u32,
    pub top_half: u32,
    pub bottom_half: u32,
}

impl RecordCounts {
    /// Add one deck's results.
    pub fn add(&mut self, stats: &DeckStats) {
        self.wins += stats.game_wins;
        self.losses += stats.game_losses;
        self.trophies += stats.trophies;
        self.last_place += stats.last_place;
        self.top_half += stats.top_half;
        self.bottom_half += stats.bottom_half;
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }
}
