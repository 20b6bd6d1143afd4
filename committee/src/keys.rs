//! Store key layout.
//!
//! ```text
//! 0x00 | account                  -> Signer
//! 0x01 | epoch (8) | quorum (8)   -> Quorum
//! 0x02 | epoch (8) | account      -> registration signature (G1)
//! 0x03 | epoch (8)                -> quorum count
//! 0x05                            -> Params
//! 0x06                            -> epoch number
//! ```
//!
//! Integers are big-endian so that prefix scans return keys in numeric order.

use crate::types::{Account, ACCOUNT_LENGTH};

const SIGNER_PREFIX: u8 = 0x00;
const QUORUM_PREFIX: u8 = 0x01;
const REGISTRATION_PREFIX: u8 = 0x02;
const QUORUM_COUNT_PREFIX: u8 = 0x03;
const PARAMS_KEY: u8 = 0x05;
const EPOCH_NUMBER_KEY: u8 = 0x06;

fn key(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = 1 + parts.iter().map(|part| part.len()).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.push(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

pub fn signer(account: &Account) -> Vec<u8> {
    key(SIGNER_PREFIX, &[account.as_ref()])
}

pub fn signers() -> Vec<u8> {
    vec![SIGNER_PREFIX]
}

pub fn quorum(epoch: u64, quorum_id: u64) -> Vec<u8> {
    key(QUORUM_PREFIX, &[&epoch.to_be_bytes(), &quorum_id.to_be_bytes()])
}

pub fn quorums(epoch: u64) -> Vec<u8> {
    key(QUORUM_PREFIX, &[&epoch.to_be_bytes()])
}

pub fn registration(epoch: u64, account: &Account) -> Vec<u8> {
    key(REGISTRATION_PREFIX, &[&epoch.to_be_bytes(), account.as_ref()])
}

pub fn registrations(epoch: u64) -> Vec<u8> {
    key(REGISTRATION_PREFIX, &[&epoch.to_be_bytes()])
}

pub fn all_registrations() -> Vec<u8> {
    vec![REGISTRATION_PREFIX]
}

pub fn quorum_count(epoch: u64) -> Vec<u8> {
    key(QUORUM_COUNT_PREFIX, &[&epoch.to_be_bytes()])
}

pub fn params() -> Vec<u8> {
    vec![PARAMS_KEY]
}

pub fn epoch_number() -> Vec<u8> {
    vec![EPOCH_NUMBER_KEY]
}

/// Extracts `(epoch, account)` from a registration key.
pub fn parse_registration(key: &[u8]) -> Option<(u64, Account)> {
    if key.len() != 1 + 8 + ACCOUNT_LENGTH || key[0] != REGISTRATION_PREFIX {
        return None;
    }
    let epoch = u64::from_be_bytes(key[1..9].try_into().ok()?);
    let account = Account::try_from(&key[9..]).ok()?;
    Some((epoch, account))
}
