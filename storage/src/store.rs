//! Traits for interacting with an ordered key-value store.

use crate::{batch::Batch, Error};
use commonware_codec::{Decode, Encode, Read};
use commonware_utils::hex;

/// A read-only key-value store with ordered keys.
pub trait Store {
    /// Get the value for a given key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

    /// Returns every key-value pair whose key starts with `prefix`, in ascending key order.
    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error>;

    /// Get the value for a given key and decode it.
    ///
    /// A value that does not decode (or leaves trailing bytes) is reported as [Error::Corrupted].
    fn get_decoded<V: Read>(&self, key: &[u8], cfg: &V::Cfg) -> Result<Option<V>, Error> {
        let Some(bytes) = self.get(key)? else {
            return Ok(None);
        };
        V::decode_cfg(bytes.as_slice(), cfg)
            .map(Some)
            .map_err(|source| Error::Corrupted {
                key: hex(key),
                source,
            })
    }

    /// Returns a new empty batch of changes layered over this store.
    fn start_batch(&self) -> Batch<'_, Self>
    where
        Self: Sized,
    {
        Batch::new(self)
    }
}

/// A mutable key-value store.
pub trait StoreMut: Store {
    /// Set the value for a given key.
    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Error>;

    /// Delete the value for a given key.
    ///
    /// Returns `true` if the key existed and was deleted, `false` if it did not exist.
    fn delete(&mut self, key: &[u8]) -> Result<bool, Error>;

    /// Encode `value` and store it under `key`.
    fn set_encoded<V: Encode>(&mut self, key: Vec<u8>, value: &V) -> Result<(), Error> {
        self.set(key, value.encode().to_vec())
    }

    /// Writes a set of changes to the store.
    ///
    /// A value of `Some` creates or updates the key and `None` deletes it. Either every change
    /// is applied or (if an error is returned) the store must be considered unusable, so
    /// backends that can fail part way through should override this to apply atomically.
    fn write_batch<I>(&mut self, changes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (Vec<u8>, Option<Vec<u8>>)>,
    {
        for (key, value) in changes {
            match value {
                Some(value) => self.set(key, value)?,
                None => {
                    self.delete(&key)?;
                }
            }
        }
        Ok(())
    }
}
