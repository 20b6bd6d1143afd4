//! An in-memory [Store] backed by a [BTreeMap].

use crate::{
    store::{Store, StoreMut},
    Error,
};
use std::collections::BTreeMap;
use tracing::debug;

/// An in-memory, ordered key-value store.
///
/// Writes never fail, so batches written to [Memory] are always applied in full.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Memory {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys in the store.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Store for Memory {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.map.get(key).cloned())
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error> {
        Ok(self
            .map
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

impl StoreMut for Memory {
    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Error> {
        self.map.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool, Error> {
        Ok(self.map.remove(key).is_some())
    }

    fn write_batch<I>(&mut self, changes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (Vec<u8>, Option<Vec<u8>>)>,
    {
        let mut updated = 0;
        let mut deleted = 0;
        for (key, value) in changes {
            match value {
                Some(value) => {
                    self.map.insert(key, value);
                    updated += 1;
                }
                None => {
                    self.map.remove(&key);
                    deleted += 1;
                }
            }
        }
        debug!(updated, deleted, "wrote batch");
        Ok(())
    }
}
