//! Support for batching changes to an underlying key-value store.

use crate::{
    store::{Store, StoreMut},
    Error,
};
use std::collections::{btree_map, BTreeMap};

/// A batch of changes which may be written to an underlying store with [StoreMut::write_batch].
/// Writes and deletes to a batch are not applied to the store until the batch is written but
/// will be reflected in reads (and scans) from the batch.
pub struct Batch<'a, S: Store> {
    /// The underlying k/v store.
    store: &'a S,

    /// The diff of changes to the store.
    ///
    /// If the value is Some, the key is being created or updated.
    /// If the value is None, the key is being deleted.
    ///
    /// We use a BTreeMap instead of HashMap to allow for a deterministic iteration order.
    diff: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a, S: Store> Batch<'a, S> {
    /// Returns a new batch of changes that may be written to `store`.
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            diff: BTreeMap::new(),
        }
    }

    /// Returns the number of keys touched by the batch.
    pub fn len(&self) -> usize {
        self.diff.len()
    }

    /// Returns true if the batch contains no changes.
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }

    /// Consumes the batch, returning its changes in ascending key order.
    pub fn into_changes(self) -> btree_map::IntoIter<Vec<u8>, Option<Vec<u8>>> {
        self.diff.into_iter()
    }
}

impl<S: Store> Store for Batch<'_, S> {
    /// Returns the value of `key` in the batch, or the value in the store if it is not present
    /// in the batch.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        if let Some(value) = self.diff.get(key) {
            return Ok(value.clone());
        }
        self.store.get(key)
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.store.scan(prefix)?.into_iter().collect();
        for (key, value) in self
            .diff
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

impl<S: Store> StoreMut for Batch<'_, S> {
    /// Updates the value of `key` to `value` in the batch.
    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Error> {
        self.diff.insert(key, Some(value));
        Ok(())
    }

    /// Deletes `key` from the batch.
    /// Returns true if the key was in the batch or store, false otherwise.
    fn delete(&mut self, key: &[u8]) -> Result<bool, Error> {
        if let Some(entry) = self.diff.get_mut(key) {
            return Ok(entry.take().is_some());
        }
        if self.store.get(key)?.is_some() {
            self.diff.insert(key.to_vec(), None);
            return Ok(true);
        }
        Ok(false)
    }
}
