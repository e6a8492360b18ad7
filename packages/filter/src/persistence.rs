//! Serialization, restore and cross-view copy of filter trees.
//!
//! Stored trees come from a different counter lineage than the tree they
//! are loaded into, so every path that adopts a stored tree goes through
//! `REPLACE_STATE` id reconciliation.

use incident_map_filter_models::{FilterAction, FilterTree, FilterTreeSnapshot};
use incident_map_storage::{SlotStore, StorageError, registry};
use thiserror::Error;

use crate::defaults::initial_filter_state;
use crate::reducer::{dispatch_at_path, reconcile};

/// Errors from persisting or copying filter trees.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The tree could not be encoded, or a copy source could not be decoded.
    #[error("Invalid filter tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The slot store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored tree carries ids that leave no room for its counter.
    #[error("Filter tree ids exceed the id space")]
    IdSpaceExhausted,

    /// A copy was requested from a slot that holds nothing.
    #[error("No filter tree stored under '{key}'")]
    MissingSource {
        /// The empty slot's key.
        key: String,
    },
}

/// Encodes `tree` as the JSON stored in a slot.
///
/// # Errors
///
/// Returns [`PersistenceError::Json`] if encoding fails.
pub fn serialize(tree: &FilterTree) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(tree)?)
}

fn decode(blob: &str) -> Result<FilterTreeSnapshot, serde_json::Error> {
    serde_json::from_str(blob)
}

fn adopt(snapshot: &FilterTreeSnapshot, counter: u32) -> Result<FilterTree, PersistenceError> {
    reconcile(snapshot, counter).ok_or(PersistenceError::IdSpaceExhausted)
}

fn decode_and_adopt(blob: &str) -> Result<FilterTree, PersistenceError> {
    let snapshot = decode(blob)?;
    adopt(&snapshot, snapshot.index.unwrap_or(0))
}

/// Rebuilds a tree from a stored blob.
///
/// A missing blob yields the default tree. So does a corrupt one, after a
/// warning; corruption is never reported to the caller.
#[must_use]
pub fn restore(blob: Option<&str>) -> FilterTree {
    let Some(blob) = blob else {
        return initial_filter_state(0);
    };
    decode_and_adopt(blob).unwrap_or_else(|e| {
        log::warn!("Discarding corrupt stored filter tree: {e}");
        initial_filter_state(0)
    })
}

/// Adopts the tree stored in `source` into `receiving`, renumbering nodes
/// against the receiving counter.
///
/// # Errors
///
/// Returns [`PersistenceError::Json`] if `source` is not a filter tree, or
/// [`PersistenceError::IdSpaceExhausted`] if its ids cannot be adopted.
pub fn copy_filters(source: &str, receiving: &FilterTree) -> Result<FilterTree, PersistenceError> {
    let snapshot = decode(source)?;
    adopt(&snapshot, receiving.index)
}

/// A filter tree persisted under one slot key.
///
/// Every transition made through the slot is written back immediately.
pub struct FilterSlot<'s, S: SlotStore + ?Sized> {
    store: &'s mut S,
    key: String,
}

impl<'s, S: SlotStore + ?Sized> FilterSlot<'s, S> {
    /// Binds `key` in `store`.
    pub fn new(store: &'s mut S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Binds the slot of the registered view `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownView`] if no such view is registered.
    pub fn for_view(store: &'s mut S, name: &str) -> Result<Self, PersistenceError> {
        let view = registry::view(name)?;
        Ok(Self::new(store, view.key))
    }

    /// The slot key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored tree.
    ///
    /// An empty slot yields the default tree. A corrupt blob is deleted and
    /// the default tree returned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if the store cannot be read.
    pub fn load(&mut self) -> Result<FilterTree, PersistenceError> {
        let Some(blob) = self.store.load(&self.key)? else {
            log::debug!("Slot '{}' is empty, starting from defaults", self.key);
            return Ok(initial_filter_state(0));
        };
        match decode_and_adopt(&blob) {
            Ok(tree) => Ok(tree),
            Err(e) => {
                log::warn!(
                    "Discarding corrupt filter tree in slot '{}': {e}",
                    self.key
                );
                self.store.remove(&self.key)?;
                Ok(initial_filter_state(0))
            }
        }
    }

    /// Writes `tree` to the slot.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if encoding or writing fails.
    pub fn save(&mut self, tree: &FilterTree) -> Result<(), PersistenceError> {
        let blob = serialize(tree)?;
        self.store.save(&self.key, &blob)?;
        log::debug!(
            "Saved {} filter(s) to slot '{}'",
            tree.filters.len(),
            self.key
        );
        Ok(())
    }

    /// Loads, applies `action` and saves the result.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the slot cannot be read or written.
    pub fn dispatch(&mut self, action: &FilterAction) -> Result<FilterTree, PersistenceError> {
        self.dispatch_at_path(&[], action)
    }

    /// Like [`Self::dispatch`], but inside the container reached by `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the slot cannot be read or written.
    pub fn dispatch_at_path(
        &mut self,
        path: &[u32],
        action: &FilterAction,
    ) -> Result<FilterTree, PersistenceError> {
        let current = self.load()?;
        let next = dispatch_at_path(&current, path, action);
        self.save(&next)?;
        Ok(next)
    }

    /// Resets the slot to the default tree, keeping its counter moving.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the slot cannot be read or written.
    pub fn reset(&mut self) -> Result<FilterTree, PersistenceError> {
        self.dispatch(&FilterAction::ResetFilters)
    }

    /// Replaces this slot's tree with the one stored under `source_key`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MissingSource`] if the source slot is
    /// empty, [`PersistenceError::Json`] if it is corrupt, or a storage
    /// error.
    pub fn copy_from(&mut self, source_key: &str) -> Result<FilterTree, PersistenceError> {
        let source = self
            .store
            .load(source_key)?
            .ok_or_else(|| PersistenceError::MissingSource {
                key: source_key.to_string(),
            })?;
        let receiving = self.load()?;
        let next = copy_filters(&source, &receiving)?;
        self.save(&next)?;
        log::info!(
            "Copied {} filter(s) from '{source_key}' to '{}'",
            next.filters.len(),
            self.key
        );
        Ok(next)
    }
}
