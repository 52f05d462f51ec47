//! Every statistic category computed over one corpus snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::archetypes::{archetype_stats, ArchetypeSet};
use super::cards::{card_stats, CardSet, CardStatsRequest};
use super::colors::{color_stats, ColorSet, ColorStatsRequest};
use super::players::{player_stats, PlayerSet};
use super::synergy::{synergy_stats, SynergySet, SynergyStatsRequest};
use super::{Bucketing, StatsResponse};
use crate::models::CardCatalog;
use crate::storage::CorpusDeck;

/// Request options for each aggregator in a report.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub cards: CardStatsRequest,
    pub colors: ColorStatsRequest,
    /// Bucketing for archetype and player statistics
    pub bucketing: Bucketing,
    pub synergy: SynergyStatsRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub corpus_version: u64,
    pub total_decks: usize,
    pub cards: StatsResponse<CardSet>,
    pub colors: StatsResponse<ColorSet>,
    pub archetypes: StatsResponse<ArchetypeSet>,
    pub players: StatsResponse<PlayerSet>,
    pub synergy: SynergySet,
}

pub fn build_report(
    corpus_version: u64,
    decks: &[Arc<CorpusDeck>],
    catalog: &CardCatalog,
    options: &ReportOptions,
) -> Report {
    Report {
        generated_at: Utc::now(),
        corpus_version,
        total_decks: decks.len(),
        cards: card_stats(decks, catalog, &options.cards),
        colors: color_stats(decks, &options.colors),
        archetypes: archetype_stats(decks, options.bucketing),
        players: player_stats(decks, options.bucketing),
        synergy: synergy_stats(decks, catalog, &options.synergy),
    }
}
