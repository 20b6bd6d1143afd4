//! Commands accepted by the engine.
//!
//! Commands carry raw bytes as received at the ledger boundary. [validate_basic] checks
//! lengths only. Whether the bytes decode to valid points is decided by the proof-of-possession
//! check when the command executes.
//!
//! [validate_basic]: RegisterSigner::validate_basic

use crate::{
    types::{ACCOUNT_LENGTH, MAX_SOCKET_LENGTH},
    Error,
};
use dasigners_cryptography::bn254::group::{G1_ELEMENT_BYTE_LENGTH, G2_ELEMENT_BYTE_LENGTH};

fn check_length(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), Error> {
    if bytes.len() != expected {
        return Err(Error::InvalidLength(field, bytes.len()));
    }
    Ok(())
}

fn check_socket(socket: &str) -> Result<(), Error> {
    if socket.len() > MAX_SOCKET_LENGTH {
        return Err(Error::InvalidSocket("too long"));
    }
    Ok(())
}

/// Registers a new signer with a proof-of-possession of its keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterSigner {
    pub account: Vec<u8>,
    pub socket: String,
    pub pubkey_g1: Vec<u8>,
    pub pubkey_g2: Vec<u8>,
    /// Signature over the registration message for `account`.
    pub signature: Vec<u8>,
}

impl RegisterSigner {
    pub fn validate_basic(&self) -> Result<(), Error> {
        check_length("account", &self.account, ACCOUNT_LENGTH)?;
        check_length("pubkey_g1", &self.pubkey_g1, G1_ELEMENT_BYTE_LENGTH)?;
        check_length("pubkey_g2", &self.pubkey_g2, G2_ELEMENT_BYTE_LENGTH)?;
        check_length("signature", &self.signature, G1_ELEMENT_BYTE_LENGTH)?;
        check_socket(&self.socket)
    }
}

/// Registers an existing signer for the committee of the next epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterNextEpoch {
    pub account: Vec<u8>,
    /// Signature over the epoch registration message for `account` and the next epoch.
    pub signature: Vec<u8>,
}

impl RegisterNextEpoch {
    pub fn validate_basic(&self) -> Result<(), Error> {
        check_length("account", &self.account, ACCOUNT_LENGTH)?;
        check_length("signature", &self.signature, G1_ELEMENT_BYTE_LENGTH)
    }
}

/// Replaces the socket of an existing signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateSocket {
    pub account: Vec<u8>,
    pub socket: String,
}

impl UpdateSocket {
    pub fn validate_basic(&self) -> Result<(), Error> {
        check_length("account", &self.account, ACCOUNT_LENGTH)?;
        check_socket(&self.socket)
    }
}
