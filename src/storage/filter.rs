//! Filtering the corpus by player, date range, draft size and query string.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::{deck_matches, Query, QueryError};

use super::CorpusDeck;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which decks a caller wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecksRequest {
    /// Exact player name, case-insensitive
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub player: String,

    /// Inclusive lower bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start: String,

    /// Inclusive upper bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end: String,

    /// Minimum number of decks in the draft
    #[serde(default, rename = "size")]
    pub min_draft_size: usize,

    /// Filter query string
    #[serde(default, rename = "match", skip_serializing_if = "String::is_empty")]
    pub query: String,
}

impl DecksRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A request compiled for repeated evaluation.
#[derive(Debug, Clone)]
pub struct DeckFilter {
    player: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    min_draft_size: usize,
    query: Query,
    /// Set when a date bound could not be parsed; nothing matches.
    invalid: bool,
}

fn parse_bound(name: &str, value: &str) -> Result<Option<NaiveDate>, ()> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|e| warn!("Ignoring request: bad {} date {:?}: {}", name, value, e))
}

impl DeckFilter {
    /// Compile a request. With `strict`, unsupported query terms are rejected.
    pub fn new(request: &DecksRequest, strict: bool) -> Result<Self, QueryError> {
        let query = if strict {
            Query::parse_strict(&request.query)?
        } else {
            Query::parse(&request.query)
        };

        let start = parse_bound("start", &request.start);
        let end = parse_bound("end", &request.end);
        let invalid = start.is_err() || end.is_err();

        Ok(Self {
            player: (!request.player.is_empty()).then(|| request.player.to_lowercase()),
            start: start.ok().flatten(),
            end: end.ok().flatten(),
            min_draft_size: request.min_draft_size,
            query,
            invalid,
        })
    }

    pub fn matches(&self, deck: &CorpusDeck) -> bool {
        if self.invalid {
            return false;
        }
        if let Some(player) = &self.player {
            if deck.deck.player.to_lowercase() != *player {
                return false;
            }
        }
        if self.start.is_some() || self.end.is_some() {
            let Ok(date) = NaiveDate::parse_from_str(&deck.deck.date, DATE_FORMAT) else {
                return false;
            };
            if self.start.is_some_and(|s| date < s) || self.end.is_some_and(|e| date > e) {
                return false;
            }
        }
        if deck.draft_size < self.min_draft_size {
            return false;
        }
        deck_matches(deck, &self.query)
    }
}

/// Apply a compiled filter, keeping load order.
pub fn filter_decks(decks: &[Arc<CorpusDeck>], filter: &DeckFilter) -> Vec<Arc<CorpusDeck>> {
    decks
        .iter()
        .filter(|d| filter.matches(d))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, Deck};

    fn deck(player: &str, date: &str, draft_size: usize, labels: &[&str]) -> Arc<CorpusDeck> {
        let d = Deck {
            player: player.to_string(),
            date: date.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            mainboard: vec![Card::named("Lightning Bolt")],
            ..Default::default()
        };
        Arc::new(CorpusDeck::new(d, draft_size))
    }

    fn corpus() -> Vec<Arc<CorpusDeck>> {
        vec![
            deck("Alice", "2024-01-10", 8, &["aggro"]),
            deck("Bob", "2024-02-10", 6, &["control"]),
            deck("alice", "2024-03-10", 4, &["control"]),
            deck("Carol", "not-a-date", 8, &["tempo"]),
        ]
    }

    fn run(request: DecksRequest) -> Vec<String> {
        let filter = DeckFilter::new(&request, false).unwrap();
        filter_decks(&corpus(), &filter)
            .iter()
            .map(|d| format!("{}@{}", d.deck.player, d.deck.date))
            .collect()
    }

    #[test]
    fn test_empty_request_returns_everything() {
        assert!(DecksRequest::default().is_empty());
        assert_eq!(run(DecksRequest::default()).len(), 4);
    }

    #[test]
    fn test_player_is_case_insensitive_exact() {
        let found = run(DecksRequest {
            player: "ALICE".to_string(),
            ..Default::default()
        });
        assert_eq!(found, vec!["Alice@2024-01-10", "alice@2024-03-10"]);

        let none = run(DecksRequest {
            player: "Ali".to_string(),
            ..Default::default()
        });
        assert!(none.is_empty());
    }

    #[test]
    fn test_player_match_folds_non_ascii_case() {
        let decks = vec![deck("Émile", "2024-01-10", 8, &[]), deck("Zoë", "2024-01-10", 8, &[])];
        let request = DecksRequest {
            player: "ÉMILE".to_string(),
            ..Default::default()
        };
        let filter = DeckFilter::new(&request, false).unwrap();
        let found = filter_decks(&decks, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].deck.player, "Émile");
    }

    #[test]
    fn test_date_range_is_inclusive_and_drops_bad_dates() {
        let found = run(DecksRequest {
            start: "2024-01-10".to_string(),
            end: "2024-02-10".to_string(),
            ..Default::default()
        });
        assert_eq!(found, vec!["Alice@2024-01-10", "Bob@2024-02-10"]);
    }

    #[test]
    fn test_bad_request_date_matches_nothing() {
        let found = run(DecksRequest {
            start: "January".to_string(),
            ..Default::default()
        });
        assert!(found.is_empty());
    }

    #[test]
    fn test_min_draft_size() {
        let found = run(DecksRequest {
            min_draft_size: 6,
            ..Default::default()
        });
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_query_routes_through_engine() {
        let found = run(DecksRequest {
            query: "arch:control".to_string(),
            ..Default::default()
        });
        assert_eq!(found, vec!["Bob@2024-02-10", "alice@2024-03-10"]);
    }

    #[test]
    fn test_strict_rejects_unsupported_terms() {
        let request = DecksRequest {
            query: "winpct>50".to_string(),
            ..Default::default()
        };
        assert!(DeckFilter::new(&request, true).is_err());
        assert!(DeckFilter::new(&request, false).is_ok());
    }

    #[test]
    fn test_request_deserialize_wire_names() {
        let request: DecksRequest =
            serde_json::from_str(r#"{"player": "Bob", "size": 6, "match": "arch:aggro"}"#).unwrap();
        assert_eq!(request.min_draft_size, 6);
        assert_eq!(request.query, "arch:aggro");
    }
}
