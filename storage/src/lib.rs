//! Persist and retrieve committee state from an ordered key-value store.
//!
//! # Status
//!
//! `dasigners-storage` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use thiserror::Error;

pub mod batch;
pub mod memory;
pub mod store;

pub use batch::Batch;
pub use memory::Memory;
pub use store::{Store, StoreMut};

/// Errors that can occur when interacting with a [Store].
#[derive(Debug, Error)]
pub enum Error {
    #[error("corrupted value at key {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: commonware_codec::Error,
    },
}
