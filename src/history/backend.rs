//! Durable key-value storage behind the history store.
//!
//! Writes return an explicit [`StoreError`]; callers branch on [`StoreError::kind`] to tell
//! a full store apart from every other failure.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

const FILE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage quota exceeded: write needs {needed} bytes, quota is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    QuotaExceeded,
    Other,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::QuotaExceeded { .. } => StoreErrorKind::QuotaExceeded,
            _ => StoreErrorKind::Other,
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        self.kind() == StoreErrorKind::QuotaExceeded
    }
}

/// Synchronous string key-value storage, the shape of browser local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store with an optional byte quota over all keys and values
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<u64>,
    failure: Option<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self { quota_bytes: Some(quota_bytes), ..Self::default() }
    }

    /// Every `set` fails with a non-quota backend error
    pub fn with_failure(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()), ..Self::default() }
    }

    /// Seed a raw value without quota checks
    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of successful `set` calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn used_bytes_excluding(&self, key: &str) -> u64 {
        self.entries.iter().filter(|(k, _)| k.as_str() != key).map(|(k, v)| (k.len() + v.len()) as u64).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(message) = &self.failure {
            return Err(StoreError::Backend(message.clone()));
        }

        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + (key.len() + value.len()) as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStore {
    /// Open (creating if missing) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir, quota_bytes: None })
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.contains("..")
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }

    /// Bytes used by every stored key except `path`
    fn used_bytes_excluding(&self, path: &Path) -> Result<u64, StoreError> {
        let mut used = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let entry_path = entry.path();
            let is_store_file = entry_path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
            if is_store_file && entry_path != path {
                used += entry.metadata()?.len();
            }
        }
        Ok(used)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;

        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(&path)? + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        // Atomic replace: write a temp file then rename over the target
        let temp = self.dir.join(format!("{}.{}.tmp", key, FILE_EXTENSION));
        fs::write(&temp, value)?;
        if let Err(e) = fs::rename(&temp, &path) {
            if let Err(cleanup) = fs::remove_file(&temp)
                && cleanup.kind() != io::ErrorKind::NotFound
            {
                warn!(path = %temp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(e.into());
        }
        debug!(path = %path.display(), bytes = value.len(), "persisted key");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
