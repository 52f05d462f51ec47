//! Deck index: enumerates drafts and the deck files belonging to each.

use serde::{Deserialize, Serialize};

/// Top-level index file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckIndex {
    #[serde(default)]
    pub drafts: Vec<DraftIndex>,
}

/// One draft in the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftIndex {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub decks: Vec<DeckFileRef>,
}

/// Pointer to a deck file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckFileRef {
    pub path: String,
}

impl DeckIndex {
    pub fn deck_count(&self) -> usize {
        self.drafts.iter().map(|d| d.decks.len()).sum()
    }
}
