//! Durable key-value storage for the progress log.
//!
//! Models a browser-style local store: string values under string keys,
//! with a total capacity quota. A write that would exceed the quota is
//! rejected and leaves the previous value in place.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default total capacity, matching a typical browser local-storage quota.
pub const DEFAULT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// Errors from durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is full: writing {needed} bytes would exceed the {capacity} byte quota")]
    QuotaExceeded { needed: usize, capacity: usize },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A string key-value store with a capacity quota.
pub trait KeyValueStore: Send {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`. On error the previous value is kept.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// [`KeyValueStore`] keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    capacity: usize,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_capacity(dir, DEFAULT_CAPACITY_BYTES)
    }

    pub fn with_capacity(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            dir: dir.into(),
            capacity,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Bytes used by every key except `key`.
    fn used_by_others(&self, key: &str) -> Result<usize, StorageError> {
        let own = format!("{key}.json");
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut total = 0usize;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == own || !name.ends_with(".json") {
                continue;
            }
            total += entry.metadata()?.len() as usize;
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let needed = self.used_by_others(key)? + value.len();
        if needed > self.capacity {
            return Err(StorageError::QuotaExceeded {
                needed,
                capacity: self.capacity,
            });
        }

        std::fs::create_dir_all(&self.dir)?;

        // A failed write leaves the previous value intact.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        assert!(store.get("progress").unwrap().is_none());
    }

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        store.set("progress", "[1,2]").unwrap();
        assert_eq!(store.get("progress").unwrap().as_deref(), Some("[1,2]"));
        store.remove("progress").unwrap();
        assert!(store.get("progress").unwrap().is_none());
        // Removing twice is fine.
        store.remove("progress").unwrap();
    }

    #[test]
    fn over_quota_write_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_capacity(dir.path(), 10);
        store.set("progress", "small").unwrap();

        let err = store.set("progress", "this is far too long").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded { needed: 20, capacity: 10 }
        ));
        assert_eq!(store.get("progress").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn quota_counts_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_capacity(dir.path(), 10);
        store.set("other", "123456").unwrap();
        assert!(store.set("progress", "12345").is_err());
        assert!(store.set("progress", "1234").is_ok());
        // Overwriting a key does not count its own old size.
        assert!(store.set("progress", "4321").is_ok());
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.get("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.set("", "x"), Err(StorageError::InvalidKey(_))));
    }
}
