//! Decks, games and matches, plus the metrics derived from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::colors::{basic_land_color, color_identities, color_rank};
use super::Card;

/// The four canonical strategic labels.
pub const MACRO_ARCHETYPES: [&str; 4] = ["aggro", "midrange", "control", "tempo"];

/// Outcome of a game or match from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

/// Decide a result for `player` given the recorded winner.
/// An empty winner or an explicit tie is always a draw.
fn result_for(player: &str, winner: &str, tie: bool) -> GameResult {
    if tie || winner.is_empty() {
        GameResult::Draw
    } else if winner == player {
        GameResult::Win
    } else {
        GameResult::Loss
    }
}

/// A single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub opponent: String,

    /// Empty means draw
    #[serde(default)]
    pub winner: String,

    #[serde(default)]
    pub tie: bool,
}

impl Game {
    pub fn result(&self, player: &str) -> GameResult {
        result_for(player, &self.winner, self.tie)
    }
}

/// A best-of-N match against one opponent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub opponent: String,

    /// Empty means draw
    #[serde(default)]
    pub winner: String,
}

impl Match {
    pub fn result(&self, player: &str) -> GameResult {
        result_for(player, &self.winner, false)
    }
}

/// Provenance for a deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckMetadata {
    #[serde(default)]
    pub draft_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// One player's build from one draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub player: String,

    /// YYYY-MM-DD
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub mainboard: Vec<Card>,

    #[serde(default)]
    pub sideboard: Vec<Card>,

    /// Undifferentiated pool when the main/side split is unknown
    #[serde(default)]
    pub pool: Vec<Card>,

    #[serde(default)]
    pub games: Vec<Game>,

    #[serde(default)]
    pub matches: Vec<Match>,

    /// Explicit color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,

    #[serde(default)]
    pub metadata: DeckMetadata,

    // Legacy aggregate results. When present they replace values derived from `games`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ties: Option<u32>,

    // Same idea for matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_wins: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_losses: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_draws: Option<u32>,
}

impl Deck {
    pub fn draft_id(&self) -> &str {
        &self.metadata.draft_id
    }

    fn count_games(&self, wanted: GameResult) -> u32 {
        self.games
            .iter()
            .filter(|g| g.result(&self.player) == wanted)
            .count() as u32
    }

    fn count_matches(&self, wanted: GameResult) -> u32 {
        self.matches
            .iter()
            .filter(|m| m.result(&self.player) == wanted)
            .count() as u32
    }

    pub fn game_wins(&self) -> u32 {
        self.wins.unwrap_or_else(|| self.count_games(GameResult::Win))
    }

    pub fn game_losses(&self) -> u32 {
        self.losses
            .unwrap_or_else(|| self.count_games(GameResult::Loss))
    }

    pub fn game_draws(&self) -> u32 {
        self.ties.unwrap_or_else(|| self.count_games(GameResult::Draw))
    }

    pub fn match_wins(&self) -> u32 {
        self.match_wins
            .unwrap_or_else(|| self.count_matches(GameResult::Win))
    }

    pub fn match_losses(&self) -> u32 {
        self.match_losses
            .unwrap_or_else(|| self.count_matches(GameResult::Loss))
    }

    pub fn match_draws(&self) -> u32 {
        self.match_draws
            .unwrap_or_else(|| self.count_matches(GameResult::Draw))
    }

    /// 1 for a perfect record of at least three match wins. Draws are allowed.
    pub fn trophies(&self) -> u32 {
        u32::from(self.match_wins() >= 3 && self.match_losses() == 0)
    }

    /// 1 for a winless record of at least three match losses.
    pub fn last_place(&self) -> u32 {
        u32::from(self.match_wins() == 0 && self.match_losses() >= 3)
    }

    pub fn top_half(&self) -> u32 {
        u32::from(self.match_wins() > self.match_losses())
    }

    pub fn bottom_half(&self) -> u32 {
        u32::from(self.match_losses() > self.match_wins())
    }

    /// The first label naming a macro archetype, lowercased.
    pub fn macro_archetype(&self) -> Option<String> {
        self.labels
            .iter()
            .map(|l| l.to_lowercase())
            .find(|l| MACRO_ARCHETYPES.contains(&l.as_str()))
    }

    /// The deck's colors in WUBRG order.
    ///
    /// Uses the explicit override when set, otherwise infers from the
    /// mainboard: basic lands by name and non-hybrid colored spells.
    pub fn colors(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        match &self.colors {
            Some(explicit) if !explicit.is_empty() => {
                set.extend(explicit.iter().map(|c| c.to_uppercase()));
            }
            _ => {
                for card in &self.mainboard {
                    if card.is_basic_land() {
                        if let Some(c) = basic_land_color(&card.name) {
                            set.insert(c.to_string());
                        }
                        continue;
                    }
                    if card.is_hybrid() {
                        continue;
                    }
                    set.extend(card.colors.iter().map(|c| c.to_uppercase()));
                }
            }
        }
        let mut colors: Vec<String> = set.into_iter().collect();
        colors.sort_by_key(|c| color_rank(c));
        colors
    }

    /// Every color identity this deck counts toward.
    pub fn color_identities(&self) -> BTreeSet<String> {
        color_identities(&self.colors())
    }

    /// Whether every color the card needs is among the deck's colors.
    /// Lands and colorless spells are judged by color identity.
    pub fn can_cast(&self, card: &Card) -> bool {
        let deck_colors = self.colors();
        can_cast_with(&deck_colors, card)
    }

    /// Number of cards the player picked, excluding basic lands.
    pub fn pick_count(&self) -> usize {
        if !self.pool.is_empty() {
            return self.pool.len();
        }
        self.mainboard
            .iter()
            .chain(self.sideboard.iter())
            .filter(|c| !c.is_basic_land())
            .count()
    }

    /// Mainboard, sideboard and pool cards together.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.mainboard
            .iter()
            .chain(self.sideboard.iter())
            .chain(self.pool.iter())
    }
}

/// Castability check against a precomputed color list.
pub fn can_cast_with(deck_colors: &[String], card: &Card) -> bool {
    let needed = if card.is_land() || card.colors.is_empty() {
        &card.color_identity
    } else {
        &card.colors
    };
    needed
        .iter()
        .all(|c| deck_colors.iter().any(|d| d.eq_ignore_ascii_case(c)))
}
