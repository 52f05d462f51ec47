//! Whole-file JSON documents (index, decks, cube, reports).

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::StorageError;

/// A typed JSON document on disk.
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl<T: DeserializeOwned> JsonFile<T> {
    /// Read and parse the document.
    pub fn read(&self) -> Result<T, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }
        let file = File::open(&self.path)?;
        let value = serde_json::from_reader(BufReader::new(file))?;
        debug!("Read {:?}", self.path);
        Ok(value)
    }
}

impl<T: Serialize> JsonFile<T> {
    /// Write the document, replacing any existing file. Parent directories are created.
    pub fn write(&self, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {:?}", self.path);
        Ok(())
    }
}
