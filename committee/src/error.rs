use crate::types::Account;
use thiserror::Error;

/// Errors that can occur when interacting with the committee engine.
#[derive(Debug, Error)]
pub enum Error {
    // Registry Errors
    #[error("signer {0} already exists")]
    SignerExists(Account),
    #[error("signer {0} not found")]
    SignerNotFound(Account),
    #[error("insufficient bonded stake for {0}")]
    InsufficientBonded(Account),
    #[error("invalid signature")]
    InvalidSignature,

    // Query Errors
    #[error("quorums for epoch {0} not found")]
    QuorumNotFound(u64),
    #[error("quorum {1} out of bound at epoch {0}")]
    QuorumIdOutOfBound(u64, u64),
    #[error("row {0} out of bound")]
    RowIndexOutOfBound(u32),
    #[error("bitmap length mismatch: expected {0}, got {1}")]
    BitmapLengthMismatch(usize, usize),

    // Validation Errors
    #[error("invalid {0} length: {1}")]
    InvalidLength(&'static str, usize),
    #[error("invalid {0} hex")]
    InvalidHex(&'static str),
    #[error("invalid socket: {0}")]
    InvalidSocket(&'static str),
    #[error("invalid params: {0}")]
    InvalidParams(&'static str),

    // Consistency Errors
    #[error("epoch number not set")]
    EpochNumberNotSet,
    #[error("params not set")]
    ParamsNotSet,
    #[error("non-contiguous epoch: stored {stored}, expected {expected}")]
    NonContiguousEpoch { stored: u64, expected: u64 },
    #[error("missing quorums for epoch {0}")]
    MissingHistory(u64),
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),
    #[error("corrupted state: {0}")]
    Corrupted(&'static str),
    #[error("storage error: {0}")]
    Storage(#[from] dasigners_storage::Error),
}

impl Error {
    /// Returns true if the error indicates that engine state is inconsistent.
    ///
    /// The host must halt block processing on a fatal error instead of skipping the
    /// offending command.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::EpochNumberNotSet
                | Error::ParamsNotSet
                | Error::NonContiguousEpoch { .. }
                | Error::MissingHistory(_)
                | Error::InvalidGenesis(_)
                | Error::Corrupted(_)
                | Error::Storage(_)
        )
    }
}
