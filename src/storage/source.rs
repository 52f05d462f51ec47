//! Where decks come from.

use std::time::Instant;

use tracing::{info, warn};

use crate::models::{Deck, DeckIndex};

use super::{CorpusDeck, JsonFile, StorageConfig, StorageError};

/// Supplies the full set of decks for a corpus load.
pub trait DeckSource: Send + Sync {
    /// Load every deck. An unreadable index is an error; a bad deck is skipped.
    fn load(&self) -> Result<Vec<CorpusDeck>, StorageError>;
}

/// Reads decks listed in a cube's `index.json`.
#[derive(Debug, Clone)]
pub struct FileDeckSource {
    config: StorageConfig,
}

impl FileDeckSource {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn load_deck(&self, path: &str) -> Result<Deck, StorageError> {
        let resolved = self.config.resolve_deck_path(path)?;
        JsonFile::<Deck>::new(resolved).read()
    }
}

impl DeckSource for FileDeckSource {
    fn load(&self) -> Result<Vec<CorpusDeck>, StorageError> {
        let started = Instant::now();
        let index_path = self.config.index_path();
        info!("Loading decks from {:?}", index_path);

        let index: DeckIndex = JsonFile::new(index_path).read()?;

        let mut decks = Vec::with_capacity(index.deck_count());
        for draft in &index.drafts {
            let draft_size = draft.decks.len();
            for entry in &draft.decks {
                match self.load_deck(&entry.path) {
                    Ok(deck) => decks.push(CorpusDeck::new(deck, draft_size)),
                    Err(e) => {
                        warn!("Failed to load deck {}: {}", entry.path, e);
                    }
                }
            }
        }

        info!(
            "Loaded {} of {} decks across {} drafts in {:?}",
            decks.len(),
            index.deck_count(),
            index.drafts.len(),
            started.elapsed()
        );
        Ok(decks)
    }
}

/// Fixed set of decks, for reports over data already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticDeckSource {
    decks: Vec<CorpusDeck>,
}

impl StaticDeckSource {
    pub fn new(decks: Vec<CorpusDeck>) -> Self {
        Self { decks }
    }
}

impl DeckSource for StaticDeckSource {
    fn load(&self) -> Result<Vec<CorpusDeck>, StorageError> {
        Ok(self.decks.clone())
    }
}
