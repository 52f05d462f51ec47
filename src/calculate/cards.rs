//! Per-card performance statistics.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::elo::{elo_ratings, INITIAL_RATING};
use super::{calculate_percent, calculate_win_percent, mean, respond, total_wins, Bucketing, StatsResponse};
use crate::models::{can_cast_with, Card, CardCatalog};
use crate::storage::CorpusDeck;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Options for a card statistics request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatsRequest {
    #[serde(flatten)]
    pub bucketing: Bucketing,

    /// Only count cards sharing a color with this string, e.g. "RG"
    #[serde(default)]
    pub color: String,

    /// Drop cards seen in fewer drafts (whole-corpus responses only)
    #[serde(default)]
    pub min_drafts: u32,

    /// Drop cards with fewer recorded games (whole-corpus responses only)
    #[serde(default)]
    pub min_games: u32,
}

/// Statistics for a single card.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardStats {
    pub name: String,

    /// Decks that mainboarded the card
    pub mainboard: u32,

    /// Decks that sideboarded the card
    pub sideboard: u32,

    /// Decks that had the card in an undifferentiated pool
    pub pool: u32,

    /// Sideboard appearances in decks that could have cast the card
    pub playable_sideboard: u32,

    /// Game wins of decks mainboarding the card
    pub wins: u32,

    /// Game losses of decks mainboarding the card
    pub losses: u32,

    pub trophies: u32,
    pub last_place: u32,

    /// Catalog appearance count summed per mainboard
    pub appearances: u32,

    /// Most recent date the card was mainboarded, YYYY-MM-DD
    pub last_mainboarded: String,

    /// Mainboard count per player
    pub players: BTreeMap<String, u32>,

    /// Sideboard count per player
    pub sideboarders: BTreeMap<String, u32>,

    /// Mainboard count per deck label
    pub archetypes: BTreeMap<String, u32>,

    pub elo: i64,
    pub total_games: u32,
    pub win_percent: f64,
    pub expected_win_percent: f64,
    pub percent_of_wins: f64,
    pub mainboard_percent: f64,
    pub sideboard_percent: f64,

    pub cmc: i32,
    pub interaction: bool,
    pub counterspell: bool,
    pub removal: bool,
    pub land: bool,
    pub url: String,
    pub color_identity: Vec<String>,

    #[serde(skip)]
    last_date: Option<NaiveDate>,
}

impl CardStats {
    fn new(card: &Card) -> Self {
        Self {
            name: card.name.clone(),
            cmc: card.cmc,
            interaction: card.is_interaction(),
            counterspell: card.is_counterspell(),
            removal: card.is_removal(),
            land: card.is_land(),
            url: card.url.clone(),
            color_identity: card.color_identity.clone(),
            elo: INITIAL_RATING as i64,
            ..Default::default()
        }
    }

    /// Number of decks the card appeared in, in any role.
    pub fn drafts(&self) -> u32 {
        self.mainboard + self.sideboard + self.pool
    }

    fn record_mainboard(&mut self, card: &Card, deck: &CorpusDeck) {
        self.mainboard += 1;
        self.wins += deck.stats.game_wins;
        self.losses += deck.stats.game_losses;
        self.trophies += deck.stats.trophies;
        self.last_place += deck.stats.last_place;
        self.appearances += card.appearances;

        match NaiveDate::parse_from_str(&deck.deck.date, DATE_FORMAT) {
            Ok(date) => {
                if self.last_date.map_or(true, |last| date > last) {
                    self.last_date = Some(date);
                    self.last_mainboarded = deck.deck.date.clone();
                }
            }
            Err(e) => warn!(
                "Bad date {:?} on {}'s deck in draft {}: {}",
                deck.deck.date,
                deck.player(),
                deck.draft_id(),
                e
            ),
        }

        *self.players.entry(deck.player().to_string()).or_default() += 1;
        for label in &deck.deck.labels {
            *self.archetypes.entry(label.clone()).or_default() += 1;
        }
    }
}

/// The card statistics for one deck set, keyed by card name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardSet {
    pub data: BTreeMap<String, CardStats>,
}

/// De-duplicated catalog card names a deck played, passed, and had in its pool.
/// Mainboard names keep the deck's own first copy, which carries its replay count.
struct DeckCards<'a> {
    mainboard: BTreeMap<&'a str, &'a Card>,
    sideboard: BTreeSet<&'a str>,
    pool: BTreeSet<&'a str>,
}

fn deck_cards<'a>(deck: &'a CorpusDeck, catalog: &CardCatalog, color: &str) -> DeckCards<'a> {
    let eligible = |card: &Card| {
        catalog
            .get(&card.name)
            .is_some_and(|c| !c.is_basic_land() && c.is_color(color))
    };
    let names = |cards: &'a [Card]| -> BTreeSet<&'a str> {
        cards
            .iter()
            .filter(|&c| eligible(c))
            .map(|c| c.name.as_str())
            .collect()
    };

    let mut mainboard = BTreeMap::new();
    for card in deck.deck.mainboard.iter().filter(|&c| eligible(c)) {
        mainboard.entry(card.name.as_str()).or_insert(card);
    }
    let mut sideboard = names(&deck.deck.sideboard);
    let mut pool = BTreeSet::new();

    // A pool card the deck could not cast was effectively passed.
    for card in deck.deck.pool.iter().filter(|&c| eligible(c)) {
        let castable = catalog
            .get(&card.name)
            .is_some_and(|c| can_cast_with(&deck.colors, c));
        if castable {
            pool.insert(card.name.as_str());
        } else {
            sideboard.insert(card.name.as_str());
        }
    }

    DeckCards {
        mainboard,
        sideboard,
        pool,
    }
}

/// Average win rate of `players`' decks that left `card` out of the mainboard.
fn expected_win_percent(card: &str, players: &BTreeMap<String, u32>, decks: &[Arc<CorpusDeck>]) -> f64 {
    let rates: Vec<f64> = decks
        .iter()
        .filter(|d| players.contains_key(d.player()))
        .filter(|d| !d.deck.mainboard.iter().any(|c| c.name == card))
        .filter_map(|d| {
            let games = d.stats.game_wins + d.stats.game_losses;
            (games > 0).then(|| f64::from(d.stats.game_wins) / f64::from(games))
        })
        .collect();

    mean(&rates).map_or(0.0, |m| (100.0 * m).round())
}

/// Accumulate and post-process card statistics over one deck list.
pub fn card_set(
    decks: &[Arc<CorpusDeck>],
    catalog: &CardCatalog,
    request: &CardStatsRequest,
    apply_minimums: bool,
) -> CardSet {
    let mut data: HashMap<String, CardStats> = HashMap::new();
    let fresh = |name: &str| catalog.get(name).map(CardStats::new).unwrap_or_default();

    for deck in decks {
        let cards = deck_cards(deck, catalog, &request.color);

        for (name, card) in cards.mainboard {
            data.entry(name.to_string())
                .or_insert_with(|| fresh(name))
                .record_mainboard(card, deck);
        }

        for name in cards.sideboard {
            let Some(card) = catalog.get(name) else { continue };
            let stats = data.entry(name.to_string()).or_insert_with(|| fresh(name));
            stats.sideboard += 1;
            if can_cast_with(&deck.colors, card) {
                stats.playable_sideboard += 1;
            }
            *stats.sideboarders.entry(deck.player().to_string()).or_default() += 1;
        }

        for name in cards.pool {
            data.entry(name.to_string())
                .or_insert_with(|| fresh(name))
                .pool += 1;
        }
    }

    let ratings = elo_ratings(decks);
    let all_wins = f64::from(total_wins(decks));

    let data = data
        .into_iter()
        .filter(|(_, s)| {
            !apply_minimums || (s.drafts() >= request.min_drafts && s.wins + s.losses >= request.min_games)
        })
        .map(|(name, mut s)| {
            s.elo = ratings.get(&name).copied().unwrap_or(INITIAL_RATING as i64);
            s.expected_win_percent = expected_win_percent(&name, &s.players, decks);
            s.total_games = s.wins + s.losses;
            s.win_percent = calculate_win_percent(s.wins, s.losses);
            s.percent_of_wins = calculate_percent(f64::from(s.wins), all_wins);

            let seen = f64::from(s.mainboard + s.sideboard);
            s.mainboard_percent = calculate_percent(f64::from(s.mainboard), seen);
            s.sideboard_percent = calculate_percent(f64::from(s.sideboard), seen);
            (name, s)
        })
        .collect();

    CardSet { data }
}

/// Card statistics, bucketed when the request asks for it.
pub fn card_stats(
    decks: &[Arc<CorpusDeck>],
    catalog: &CardCatalog,
    request: &CardStatsRequest,
) -> StatsResponse<CardSet> {
    let apply_minimums = !request.bucketing.is_bucketed();
    respond(decks, request.bucketing, |d| card_set(d, catalog, request, apply_minimums))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Deck, DeckMetadata, Game};
    use pretty_assertions::assert_eq;

    fn card(name: &str, colors: &[&str]) -> Card {
        Card {
            name: name.to_string(),
            cmc: 1,
            colors: colors.iter().map(|s| s.to_string()).collect(),
            color_identity: colors.iter().map(|s| s.to_string()).collect(),
            types: vec!["Instant".to_string()],
            ..Default::default()
        }
    }

    fn basic(name: &str) -> Card {
        Card {
            name: name.to_string(),
            types: vec!["Basic".to_string(), "Land".to_string()],
            ..Default::default()
        }
    }

    fn catalog() -> CardCatalog {
        CardCatalog::new(vec![
            Card {
                appearances: 9,
                oracle_text: "Lightning Bolt deals 3 damage to any target.".to_string(),
                ..card("Lightning Bolt", &["R"])
            },
            card("Counterspell", &["U"]),
            card("Shock", &["R"]),
            card("Llanowar Elves", &["G"]),
            basic("Mountain"),
        ])
    }

    fn game(opponent: &str, winner: &str) -> Game {
        Game {
            opponent: opponent.to_string(),
            winner: winner.to_string(),
            tie: false,
        }
    }

    fn deck(player: &str, date: &str, mainboard: Vec<Card>, sideboard: Vec<Card>, games: Vec<Game>) -> Arc<CorpusDeck> {
        Arc::new(CorpusDeck::new(
            Deck {
                player: player.to_string(),
                date: date.to_string(),
                labels: vec!["aggro".to_string()],
                mainboard,
                sideboard,
                games,
                metadata: DeckMetadata {
                    draft_id: date.to_string(),
                    source_file: None,
                },
                ..Default::default()
            },
            2,
        ))
    }

    /// Alice beat Bob 2-1 with a draw on top.
    fn alice_and_bob() -> Vec<Arc<CorpusDeck>> {
        let alice = deck(
            "Alice",
            "2024-01-01",
            vec![
                Card {
                    appearances: 2,
                    ..card("Lightning Bolt", &["R"])
                },
                card("Lightning Bolt", &["R"]),
                basic("Mountain"),
            ],
            vec![card("Counterspell", &["U"]), card("Shock", &["R"])],
            vec![game("Bob", "Alice"), game("Bob", "Bob"), game("Bob", "Alice"), game("Bob", "")],
        );
        let bob = deck(
            "Bob",
            "2024-01-01",
            vec![card("Counterspell", &["U"])],
            vec![card("Lightning Bolt", &["R"])],
            vec![game("Alice", "Alice"), game("Alice", "Bob"), game("Alice", "Alice"), game("Alice", "")],
        );
        vec![alice, bob]
    }

    #[test]
    fn test_win_percent_counts_each_deck_once() {
        let set = card_set(&alice_and_bob(), &catalog(), &CardStatsRequest::default(), true);
        let bolt = &set.data["Lightning Bolt"];

        assert_eq!(bolt.mainboard, 1);
        assert_eq!(bolt.wins, 2);
        assert_eq!(bolt.losses, 1);
        assert_eq!(bolt.total_games, 3);
        assert_eq!(bolt.win_percent, 67.0);
        assert_eq!(bolt.appearances, 2);
        assert_eq!(bolt.last_mainboarded, "2024-01-01");
        assert_eq!(bolt.players.get("Alice"), Some(&1));
        assert_eq!(bolt.archetypes.get("aggro"), Some(&1));
        assert!(bolt.removal);
        assert!(bolt.interaction);
    }

    #[test]
    fn test_sideboard_and_playable_sideboard() {
        let set = card_set(&alice_and_bob(), &catalog(), &CardStatsRequest::default(), true);

        let bolt = &set.data["Lightning Bolt"];
        assert_eq!(bolt.sideboard, 1);
        // Bob is mono-blue.
        assert_eq!(bolt.playable_sideboard, 0);
        assert_eq!(bolt.sideboarders.get("Bob"), Some(&1));
        assert_eq!(bolt.mainboard_percent, 50.0);
        assert_eq!(bolt.sideboard_percent, 50.0);

        let shock = &set.data["Shock"];
        assert_eq!(shock.playable_sideboard, 1);
        assert_eq!(shock.mainboard_percent, 0.0);
    }

    #[test]
    fn test_basic_lands_and_off_catalog_cards_skipped() {
        let mut decks = alice_and_bob();
        decks.push(deck(
            "Carol",
            "2024-01-02",
            vec![card("Black Lotus", &[])],
            vec![],
            vec![],
        ));
        let set = card_set(&decks, &catalog(), &CardStatsRequest::default(), true);
        assert!(!set.data.contains_key("Mountain"));
        assert!(!set.data.contains_key("Black Lotus"));
    }

    #[test]
    fn test_appearances_come_from_deck_copies() {
        let played = |player: &str, date: &str, appearances: u32| {
            deck(
                player,
                date,
                vec![Card {
                    appearances,
                    ..card("Shock", &["R"])
                }],
                vec![],
                vec![],
            )
        };
        let decks = vec![played("Alice", "2024-01-01", 5), played("Bob", "2024-01-08", 3)];

        // The catalog copy of Shock has no replay count of its own.
        let set = card_set(&decks, &catalog(), &CardStatsRequest::default(), true);
        assert_eq!(set.data["Shock"].mainboard, 2);
        assert_eq!(set.data["Shock"].appearances, 8);
    }

    #[test]
    fn test_percent_of_wins_and_color_filter() {
        let request = CardStatsRequest {
            color: "R".to_string(),
            ..Default::default()
        };
        let set = card_set(&alice_and_bob(), &catalog(), &request, true);
        let names: Vec<&str> = set.data.keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["Lightning Bolt", "Shock"]);
        // Total wins across both decks is 3.
        assert_eq!(set.data["Lightning Bolt"].percent_of_wins, 67.0);
    }

    #[test]
    fn test_minimums_apply_only_when_requested() {
        let request = CardStatsRequest {
            min_games: 1,
            ..Default::default()
        };
        let set = card_set(&alice_and_bob(), &catalog(), &request, true);
        assert!(!set.data.contains_key("Shock"));

        let set = card_set(&alice_and_bob(), &catalog(), &request, false);
        assert!(set.data.contains_key("Shock"));
    }

    #[test]
    fn test_expected_win_percent_uses_decks_without_the_card() {
        let mut decks = alice_and_bob();
        // Alice's second deck went 1-3 without Bolt.
        decks.push(deck(
            "Alice",
            "2024-02-01",
            vec![card("Shock", &["R"])],
            vec![],
            vec![game("Bob", "Alice"), game("Bob", "Bob"), game("Bob", "Bob"), game("Bob", "Bob")],
        ));
        let set = card_set(&decks, &catalog(), &CardStatsRequest::default(), true);
        assert_eq!(set.data["Lightning Bolt"].expected_win_percent, 25.0);
        assert_eq!(set.data["Lightning Bolt"].last_mainboarded, "2024-01-01");
        assert_eq!(set.data["Counterspell"].expected_win_percent, 0.0);
    }

    #[test]
    fn test_pool_cards_split_by_castability() {
        let pool_deck = Arc::new(CorpusDeck::new(
            Deck {
                player: "Dan".to_string(),
                colors: Some(vec!["R".to_string()]),
                pool: vec![card("Shock", &["R"]), card("Counterspell", &["U"])],
                ..Default::default()
            },
            1,
        ));
        let set = card_set(&[pool_deck], &catalog(), &CardStatsRequest::default(), true);
        assert_eq!(set.data["Shock"].pool, 1);
        assert_eq!(set.data["Shock"].sideboard, 0);
        assert_eq!(set.data["Counterspell"].sideboard, 1);
        assert_eq!(set.data["Counterspell"].pool, 0);
    }

    #[test]
    fn test_elo_attached() {
        let set = card_set(&alice_and_bob(), &catalog(), &CardStatsRequest::default(), true);
        assert!(set.data["Lightning Bolt"].elo > 1200);
        assert!(set.data["Shock"].elo < 1200);
    }

    #[test]
    fn test_bucketed_response() {
        let request = CardStatsRequest {
            bucketing: Bucketing {
                bucket_size: 1,
                sliding: false,
            },
            min_games: 100,
            ..Default::default()
        };
        let response = card_stats(&alice_and_bob(), &catalog(), &request);
        assert!(response.all.is_none());
        assert_eq!(response.buckets.len(), 1);
        assert_eq!(response.buckets[0].name, "2024-01-01");
        assert!(response.buckets[0].stats.data.contains_key("Lightning Bolt"));
    }
}
