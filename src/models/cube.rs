//! The cube: cards currently eligible for statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Card;

/// Cube definition as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cube {
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Name-keyed lookup over the cube's cards.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: HashMap<String, Card>,
}

impl CardCatalog {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl From<Cube> for CardCatalog {
    fn from(cube: Cube) -> Self {
        Self::new(cube.cards)
    }
}
