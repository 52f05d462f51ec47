//! Per-player performance and drafting habits.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::{calculate_percent, respond, Bucketing, StatsResponse};
use crate::models::RecordCounts;
use crate::storage::CorpusDeck;

/// Statistics for one player.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerStats {
    pub name: String,
    pub num_decks: u32,

    #[serde(flatten)]
    pub record: RecordCounts,

    pub games: u32,
    pub win_percent: f64,
    pub loss_percent: f64,

    /// Strength of schedule averaged over decks, weighted by match count
    pub opponent_win_percentage: f64,

    pub white_percent: f64,
    pub blue_percent: f64,
    pub black_percent: f64,
    pub red_percent: f64,
    pub green_percent: f64,

    /// Distinct cards as a share of all picks
    pub uniqueness: f64,

    /// Non-basic mainboard cards across every deck
    pub total_picks: u32,

    pub unique_cards: BTreeMap<String, u32>,
    pub color_picks: BTreeMap<String, u32>,

    #[serde(skip)]
    owp_weighted: f64,
    #[serde(skip)]
    owp_matches: u32,
}

impl PlayerStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, deck: &CorpusDeck) {
        self.num_decks += 1;
        self.record.add(&deck.stats);

        let matches = deck.deck.matches.len() as u32;
        self.owp_weighted += deck.opponent_win_percentage * f64::from(matches);
        self.owp_matches += matches;

        for card in deck.deck.mainboard.iter().filter(|c| !c.is_basic_land()) {
            self.total_picks += 1;
            *self.unique_cards.entry(card.name.clone()).or_default() += 1;
            for color in &card.colors {
                *self.color_picks.entry(color.clone()).or_default() += 1;
            }
        }
    }

    fn color_percent(&self, color: &str) -> f64 {
        let picks = self.color_picks.get(color).copied().unwrap_or(0);
        calculate_percent(f64::from(picks), f64::from(self.total_picks))
    }

    fn finish(&mut self) {
        self.games = self.record.games();
        self.win_percent = calculate_percent(f64::from(self.record.wins), f64::from(self.games));
        self.loss_percent = calculate_percent(f64::from(self.record.losses), f64::from(self.games));
        if self.owp_matches > 0 {
            self.opponent_win_percentage = (self.owp_weighted / f64::from(self.owp_matches)).round();
        }

        self.white_percent = self.color_percent("W");
        self.blue_percent = self.color_percent("U");
        self.black_percent = self.color_percent("B");
        self.red_percent = self.color_percent("R");
        self.green_percent = self.color_percent("G");
        self.uniqueness = calculate_percent(self.unique_cards.len() as f64, f64::from(self.total_picks));
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerSet {
    pub players: BTreeMap<String, PlayerStats>,
}

/// Accumulate and post-process player statistics over one deck list.
pub fn player_set(decks: &[Arc<CorpusDeck>]) -> PlayerSet {
    let mut players: BTreeMap<String, PlayerStats> = BTreeMap::new();
    for deck in decks {
        players
            .entry(deck.player().to_string())
            .or_insert_with(|| PlayerStats::new(deck.player()))
            .add(deck);
    }
    for stats in players.values_mut() {
        stats.finish();
    }
    PlayerSet { players }
}

/// Player statistics, bucketed when requested.
pub fn player_stats(decks: &[Arc<CorpusDeck>], bucketing: Bucketing) -> StatsResponse<PlayerSet> {
    respond(decks, bucketing, player_set)
}
