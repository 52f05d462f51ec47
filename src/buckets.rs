//! Chronological bucketing of decks by draft.
//!
//! Buckets hold a fixed number of drafts (not decks). Drafts are ordered by
//! draft ID, which is date-prefixed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::CorpusDeck;

/// Every deck from one draft event.
#[derive(Debug, Clone)]
pub struct Draft {
    pub name: String,
    pub decks: Vec<Arc<CorpusDeck>>,
}

/// A window of consecutive drafts, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    pub drafts: Vec<Draft>,
}

impl Bucket {
    pub fn name(&self) -> String {
        match self.drafts.as_slice() {
            [] => "Empty Bucket".to_string(),
            [only] => only.name.clone(),
            [first, .., last] => format!("{} - {}", first.name, last.name),
        }
    }

    pub fn decks(&self) -> Vec<Arc<CorpusDeck>> {
        self.drafts
            .iter()
            .flat_map(|d| d.decks.iter().cloned())
            .collect()
    }

    /// Number of recorded games across every deck in the bucket.
    pub fn total_games(&self) -> usize {
        self.drafts
            .iter()
            .flat_map(|d| d.decks.iter())
            .map(|d| d.games_played())
            .sum()
    }
}

/// How windows are laid over the draft sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    /// Non-overlapping windows anchored at the most recent draft
    #[default]
    Discrete,
    /// One window starting at every draft
    Sliding,
}

/// Group decks into drafts sorted by draft ID.
pub fn group_drafts(decks: &[Arc<CorpusDeck>]) -> Vec<Draft> {
    let mut by_id: BTreeMap<&str, Vec<Arc<CorpusDeck>>> = BTreeMap::new();
    for deck in decks {
        by_id
            .entry(deck.draft_id())
            .or_default()
            .push(Arc::clone(deck));
    }
    by_id
        .into_iter()
        .map(|(name, decks)| Draft {
            name: name.to_string(),
            decks,
        })
        .collect()
}

/// Split decks into buckets of `size` drafts. A size of zero yields no buckets.
pub fn deck_buckets(decks: &[Arc<CorpusDeck>], size: usize, mode: BucketMode) -> Vec<Bucket> {
    if size == 0 {
        return Vec::new();
    }
    let drafts = group_drafts(decks);
    match mode {
        BucketMode::Discrete => discrete(drafts, size),
        BucketMode::Sliding => sliding(drafts, size),
    }
}

/// Walk back from the newest draft; leftover oldest drafts are dropped.
fn discrete(drafts: Vec<Draft>, size: usize) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut end = drafts.len();
    while end >= size {
        buckets.push(Bucket {
            drafts: drafts[end - size..end].to_vec(),
        });
        end -= size;
    }
    buckets.reverse();
    buckets
}

fn sliding(drafts: Vec<Draft>, size: usize) -> Vec<Bucket> {
    if size > drafts.len() {
        return vec![Bucket { drafts }];
    }
    drafts
        .windows(size)
        .map(|w| Bucket { drafts: w.to_vec() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Deck, DeckMetadata, Game};

    fn deck(draft: &str, games: usize) -> Arc<CorpusDeck> {
        let d = Deck {
            player: "P".to_string(),
            metadata: DeckMetadata {
                draft_id: draft.to_string(),
                source_file: None,
            },
            games: (0..games)
                .map(|_| Game {
                    opponent: "Q".to_string(),
                    winner: "P".to_string(),
                    tie: false,
                })
                .collect(),
            ..Default::default()
        };
        Arc::new(CorpusDeck::new(d, 2))
    }

    fn corpus(n: usize) -> Vec<Arc<CorpusDeck>> {
        // Insert out of order to exercise sorting.
        (0..n)
            .rev()
            .flat_map(|i| {
                let id = format!("2024-01-{:02}", i + 1);
                vec![deck(&id, 1), deck(&id, 2)]
            })
            .collect()
    }

    fn names(buckets: &[Bucket]) -> Vec<String> {
        buckets.iter().map(|b| b.name()).collect()
    }

    #[test]
    fn test_group_drafts_sorted() {
        let drafts = group_drafts(&corpus(3));
        let ids: Vec<&str> = drafts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(ids, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(drafts[0].decks.len(), 2);
    }

    #[test]
    fn test_discrete_drops_oldest_remainder() {
        let buckets = deck_buckets(&corpus(5), 2, BucketMode::Discrete);
        assert_eq!(
            names(&buckets),
            vec!["2024-01-02 - 2024-01-03", "2024-01-04 - 2024-01-05"]
        );
        assert!(buckets.iter().all(|b| b.drafts.len() == 2));
    }

    #[test]
    fn test_discrete_too_few_drafts() {
        assert!(deck_buckets(&corpus(2), 3, BucketMode::Discrete).is_empty());
    }

    #[test]
    fn test_sliding_window_count() {
        let buckets = deck_buckets(&corpus(5), 3, BucketMode::Sliding);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].name(), "2024-01-01 - 2024-01-03");
        assert_eq!(buckets[2].name(), "2024-01-03 - 2024-01-05");
    }

    #[test]
    fn test_sliding_larger_than_corpus() {
        let buckets = deck_buckets(&corpus(2), 5, BucketMode::Sliding);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].drafts.len(), 2);
    }

    #[test]
    fn test_bucket_names_and_games() {
        let buckets = deck_buckets(&corpus(1), 1, BucketMode::Discrete);
        assert_eq!(buckets[0].name(), "2024-01-01");
        assert_eq!(buckets[0].total_games(), 3);
        assert_eq!(buckets[0].decks().len(), 2);
        assert_eq!(Bucket::default().name(), "Empty Bucket");
    }

    #[test]
    fn test_zero_size() {
        assert!(deck_buckets(&corpus(3), 0, BucketMode::Sliding).is_empty());
    }
}
