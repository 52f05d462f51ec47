//! Statistics calculation engine.
//!
//! Every aggregator makes one pass over the filtered decks to accumulate
//! counters, then a post-processing pass to derive percentages:
//! - Card performance with ELO ratings and expected win rate
//! - Color performance with victory-point weighting
//! - Archetype performance
//! - Player performance
//! - Pairwise card synergy

pub mod archetypes;
pub mod cards;
pub mod colors;
pub mod elo;
pub mod players;
pub mod report;
pub mod synergy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::buckets::{deck_buckets, BucketMode};
use crate::storage::CorpusDeck;

/// Calculate a whole-number percentage. Zero when `whole` is zero.
pub fn calculate_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        (100.0 * part / whole).round()
    }
}

/// Calculate win percentage from game wins and losses.
pub fn calculate_win_percent(wins: u32, losses: u32) -> f64 {
    calculate_percent(f64::from(wins), f64::from(wins + losses))
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Pearson correlation coefficient of two equally long series.
pub fn calculate_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Sum of game wins across decks.
pub fn total_wins(decks: &[Arc<CorpusDeck>]) -> u32 {
    decks.iter().map(|d| d.stats.game_wins).sum()
}

/// Whether and how to split a response into time buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucketing {
    /// Drafts per bucket; 0 disables bucketing
    #[serde(default)]
    pub bucket_size: usize,

    #[serde(default)]
    pub sliding: bool,
}

impl Bucketing {
    pub fn is_bucketed(&self) -> bool {
        self.bucket_size > 0
    }

    pub fn mode(&self) -> BucketMode {
        if self.sliding {
            BucketMode::Sliding
        } else {
            BucketMode::Discrete
        }
    }
}

/// Statistics for one time bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BucketStats<T> {
    #[serde(flatten)]
    pub stats: T,
    pub name: String,
    /// Recorded games in the bucket
    pub games: usize,
}

/// Either whole-corpus statistics or a series of bucketed ones.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<T>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buckets: Vec<BucketStats<T>>,
}

/// Run an aggregator over the whole deck list or over each bucket.
pub fn respond<T, F>(decks: &[Arc<CorpusDeck>], bucketing: Bucketing, aggregate: F) -> StatsResponse<T>
where
    F: Fn(&[Arc<CorpusDeck>]) -> T,
{
    if !bucketing.is_bucketed() {
        return StatsResponse {
            all: Some(aggregate(decks)),
            buckets: Vec::new(),
        };
    }

    let buckets = deck_buckets(decks, bucketing.bucket_size, bucketing.mode());
    tracing::debug!(
        "Aggregating {} decks over {} buckets",
        decks.len(),
        buckets.len()
    );
    let buckets = buckets
        .iter()
        .map(|b| BucketStats {
            stats: aggregate(&b.decks()),
            name: b.name(),
            games: b.total_games(),
        })
        .collect();
    StatsResponse { all: None, buckets }
}
