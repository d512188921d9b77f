//! Persistence of the repository list.
//!
//! The list lives in a single named slot of a key-value store holding UTF-8
//! text, mirroring browser local storage. Every save replaces the whole slot.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::Repository;

#[cfg(test)]
#[path = "storage_tests.rs"]
mod storage_tests;

/// Slot holding the JSON encoded repository list.
pub const REPOSITORIES_KEY: &str = "@GithubExplorer:repositories";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access storage slot [{key}]: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("storage slot [{key}] does not contain a repository list: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode the repository list: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Named text slots, the contract of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Keeps each slot in its own file inside a data directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens the store, creating the directory when needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(slot_file_name(key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

fn slot_file_name(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    format!("{}.json", stem)
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        let items = self.items.lock().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory store lock poisoned")
}

/// Loads and saves the ordered repository list.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryStore: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<Repository>>, StoreError>;

    fn save(&self, repositories: &[Repository]) -> Result<(), StoreError>;
}

/// Stores the list as a JSON array under [`REPOSITORIES_KEY`].
pub struct SlotRepositoryStore<K> {
    store: K,
}

impl<K: KeyValueStore> SlotRepositoryStore<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &K {
        &self.store
    }
}

impl<K: KeyValueStore> RepositoryStore for SlotRepositoryStore<K> {
    #[instrument(skip(self))]
    fn load(&self) -> Result<Option<Vec<Repository>>, StoreError> {
        let stored = self
            .store
            .get_item(REPOSITORIES_KEY)
            .map_err(|source| StoreError::Io {
                key: REPOSITORIES_KEY.to_string(),
                source,
            })?;
        let Some(text) = stored else {
            debug!("No stored repository list");
            return Ok(None);
        };

        let repositories: Vec<Repository> =
            serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                key: REPOSITORIES_KEY.to_string(),
                source,
            })?;
        debug!(count = repositories.len(), "Loaded repository list");
        Ok(Some(repositories))
    }

    #[instrument(skip_all, fields(count = repositories.len()))]
    fn save(&self, repositories: &[Repository]) -> Result<(), StoreError> {
        let text = serde_json::to_string(repositories).map_err(StoreError::Encode)?;
        self.store
            .set_item(REPOSITORIES_KEY, &text)
            .map_err(|source| StoreError::Io {
                key: REPOSITORIES_KEY.to_string(),
                source,
            })
    }
}
