#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! String-keyed slot storage for persisted filter trees.
//!
//! A slot holds one serialized value under a key, like a browser's local
//! storage entry. [`MemoryStore`] backs tests and short-lived sessions;
//! [`FileStore`] keeps one JSON file per key under a directory (see
//! [`paths::filters_dir_in`]). Named views and their keys come from the
//! embedded [`registry`].

pub mod paths;
pub mod registry;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading or writing slots.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Slot key contains characters that are not allowed in a file name.
    #[error("Invalid slot key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// No view is registered under this name.
    #[error("Unknown view: {name} (known views: {known})")]
    UnknownView {
        /// The requested name.
        name: String,
        /// Comma-separated registered view names.
        known: String,
    },
}

/// A string-keyed store of serialized values.
pub trait SlotStore {
    /// Reads the value under `key`, `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes the value under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`SlotStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// [`SlotStore`] keeping each slot in `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// slot, so readers never see a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SlotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        paths::ensure_dir(&self.dir).map_err(io_error(&self.dir))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))?;

        log::debug!("Saved slot {key} ({} bytes) to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "incident_map_storage_{name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("filterState").unwrap(), None);

        store.save("filterState", "{}").unwrap();
        assert_eq!(store.load("filterState").unwrap().as_deref(), Some("{}"));

        store.remove("filterState").unwrap();
        store.remove("filterState").unwrap();
        assert_eq!(store.load("filterState").unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = scratch_dir("round_trip");
        let mut store = FileStore::new(&dir);

        assert_eq!(store.load("publishFilterState").unwrap(), None);
        store.save("publishFilterState", "{\"index\":0}").unwrap();
        assert_eq!(
            store.load("publishFilterState").unwrap().as_deref(),
            Some("{\"index\":0}")
        );
        assert!(dir.join("publishFilterState.json").exists());
        assert!(!dir.join("publishFilterState.json.tmp").exists());

        store.save("publishFilterState", "{\"index\":1}").unwrap();
        assert_eq!(
            store.load("publishFilterState").unwrap().as_deref(),
            Some("{\"index\":1}")
        );

        store.remove("publishFilterState").unwrap();
        assert_eq!(store.load("publishFilterState").unwrap(), None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn io_error_names_the_path() {
        let err = io_error(Path::new("/srv/incidents/filters/filterState.json"))(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "I/O error on /srv/incidents/filters/filterState.json: denied"
        );
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let store = FileStore::new(scratch_dir("keys"));
        assert!(matches!(
            store.load("../etc/passwd"),
            Err(StorageError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.load(""),
            Err(StorageError::InvalidKey { .. })
        ));
    }
}
