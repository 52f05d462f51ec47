//! Deck corpus storage.
//!
//! Handles the on-disk layout of a cube's data directory:
//! - `<data_dir>/<cube>/index.json` listing drafts and deck files
//! - one JSON file per deck
//! - `<data_dir>/<cube>/cube.json` with the current card catalog
//!
//! and the in-memory corpus cache built from it.

mod cache;
mod corpus;
mod filter;
mod json;
mod source;

pub use cache::*;
pub use corpus::*;
pub use filter::*;
pub use json::*;
pub use source::*;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::models::{CardCatalog, Cube};
use crate::query::QueryError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub cube: String,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf, cube: impl Into<String>) -> Self {
        Self {
            data_dir,
            cube: cube.into(),
        }
    }

    pub fn cube_dir(&self) -> PathBuf {
        self.data_dir.join(&self.cube)
    }

    pub fn index_path(&self) -> PathBuf {
        self.cube_dir().join("index.json")
    }

    pub fn cube_path(&self) -> PathBuf {
        self.cube_dir().join("cube.json")
    }

    /// Resolve a deck path from the index. Relative paths are taken from the cube directory.
    pub fn resolve_deck_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        if path.trim().is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        let p = Path::new(path);
        if p.is_absolute() {
            Ok(p.to_path_buf())
        } else {
            Ok(self.cube_dir().join(p))
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"), "polyverse")
    }
}

/// Load the cube's card catalog.
pub fn load_catalog(config: &StorageConfig) -> Result<CardCatalog, StorageError> {
    let path = config.cube_path();
    let cube: Cube = JsonFile::new(path.clone()).read()?;
    debug!("Loaded {} cube cards from {:?}", cube.cards.len(), path);
    Ok(CardCatalog::from(cube))
}
