//! Color and color-combination performance.
//!
//! Each deck counts toward every identity in its color-identity set. Card
//! level "victory points" weight a deck's wins by the share of its non-basic
//! mainboard that belongs to each identity, so a splash earns less credit
//! than a primary color.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{calculate_correlation, calculate_percent, calculate_win_percent, mean, respond, round2, total_wins, Bucketing, StatsResponse};
use crate::models::colors::COLOR_ORDER;
use crate::models::RecordCounts;
use crate::storage::CorpusDeck;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStatsRequest {
    #[serde(flatten)]
    pub bucketing: Bucketing,

    /// Count a deck only toward the identity matching all of its colors
    #[serde(default)]
    pub strict_colors: bool,
}

/// Statistics for one color identity, e.g. "R" or "WU".
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColorStats {
    pub color: String,

    #[serde(flatten)]
    pub record: RecordCounts,

    /// Mainboard cards sharing a color with this identity
    pub cards: u32,

    pub percent_of_wins: f64,

    /// Per deck, the fraction of non-basic mainboard cards of this identity
    pub deck_percentages: Vec<f64>,

    pub average_deck_percentage: f64,

    /// Share of every non-basic mainboard card in the corpus
    pub total_pick_percentage: f64,

    pub win_percent: f64,
    pub build_percent: f64,
    pub num_decks: u32,

    /// Wins weighted by each deck's share of this identity
    pub victory_points: f64,

    /// Victory points had every game been won
    pub available_victory_points: f64,

    pub victory_points_per_deck: Vec<f64>,
}

impl ColorStats {
    fn new(color: &str) -> Self {
        Self {
            color: color.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColorSet {
    pub data: BTreeMap<String, ColorStats>,
}

/// Accumulate and post-process color statistics over one deck list.
pub fn color_set(decks: &[Arc<CorpusDeck>], strict: bool) -> ColorSet {
    let mut data: BTreeMap<String, ColorStats> = BTreeMap::new();
    let mut total_cards = 0u32;

    for deck in decks {
        let identities: Vec<&String> = deck
            .color_identities
            .iter()
            .filter(|id| !strict || id.chars().count() == deck.colors.len())
            .collect();

        for id in &identities {
            let stats = data
                .entry(id.to_string())
                .or_insert_with(|| ColorStats::new(id));
            stats.record.add(&deck.stats);
            stats.num_decks += 1;
        }

        let spells: Vec<_> = deck
            .deck
            .mainboard
            .iter()
            .filter(|c| !c.is_basic_land())
            .collect();
        let in_deck = spells.len() as u32;
        total_cards += in_deck;

        let wins = f64::from(deck.stats.game_wins);
        let losses = f64::from(deck.stats.game_losses);

        for id in &identities {
            let n = spells
                .iter()
                .filter(|c| c.colors.iter().any(|color| id.contains(color.as_str())))
                .count() as u32;
            if n == 0 {
                continue;
            }
            let Some(stats) = data.get_mut(id.as_str()) else {
                continue;
            };

            let frac = f64::from(n) / f64::from(in_deck);
            stats.deck_percentages.push(frac);
            stats.victory_points_per_deck.push(frac * wins);
            if frac * (wins + losses) > 0.0 {
                stats.available_victory_points += frac * (wins + losses);
            }
            stats.cards += n;
        }
    }

    let all_wins = total_wins(decks);
    for stats in data.values_mut() {
        stats.average_deck_percentage = mean(&stats.deck_percentages).map_or(0.0, |m| (100.0 * m).round());
        stats.victory_points = round2(stats.victory_points_per_deck.iter().sum());
        stats.build_percent = calculate_percent(f64::from(stats.num_decks), decks.len() as f64);
        stats.total_pick_percentage = calculate_percent(f64::from(stats.cards), f64::from(total_cards));
        stats.win_percent = calculate_win_percent(stats.record.wins, stats.record.losses);
        if stats.record.wins != 0 {
            stats.percent_of_wins = calculate_percent(f64::from(stats.record.wins), f64::from(all_wins));
        }
    }

    let set = ColorSet { data };
    log_pick_win_correlation(&set);
    set
}

/// Whether heavily drafted colors also win more.
fn log_pick_win_correlation(set: &ColorSet) {
    let (picks, wins): (Vec<f64>, Vec<f64>) = COLOR_ORDER
        .iter()
        .map(|c| {
            set.data
                .get(*c)
                .map_or((0.0, 0.0), |s| (s.total_pick_percentage, s.win_percent))
        })
        .unzip();
    if let Some(r) = calculate_correlation(&picks, &wins) {
        debug!("Pick%/win% correlation across WUBRG: {:.3}", r);
    }
}

/// Color statistics, bucketed when the request asks for it.
pub fn color_stats(decks: &[Arc<CorpusDeck>], request: &ColorStatsRequest) -> StatsResponse<ColorSet> {
    respond(decks, request.bucketing, |d| color_set(d, request.strict_colors))
}
