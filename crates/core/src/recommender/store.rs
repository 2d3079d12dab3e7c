use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("state read failed: {0}")]
    Read(#[source] io::Error),
    #[error("state write failed: {0}")]
    Write(#[source] io::Error),
}

/// Local blob persistence for recommender state.
///
/// The recommender never propagates store failures: a failed load cold
/// starts with empty state and a failed save drops the write, both logged.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StateStoreError>;
    fn save(&self, blob: &str) -> Result<(), StateStoreError>;
}

/// Blob store backed by a single JSON file on local disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, StateStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StateStoreError::Read(error)),
        }
    }

    fn save(&self, blob: &str) -> Result<(), StateStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StateStoreError::Write)?;
            }
        }
        fs::write(&self.path, blob).map_err(StateStoreError::Write)
    }
}

/// Blob store held in memory; useful for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StateStoreError> {
        let blob = self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(blob.clone())
    }

    fn save(&self, blob: &str) -> Result<(), StateStoreError> {
        let mut slot = self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(blob.to_string());
        Ok(())
    }
}
