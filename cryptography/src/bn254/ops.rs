//! Registration messages, proof-of-possession verification, and key aggregation.

use super::group::{map_to_curve, neg_g2, pairing_check, Element, Scalar, G1, G2};
use crate::{Hasher, Keccak256};
use commonware_codec::Encode;

/// Size (in bytes) of an account address.
pub const ADDRESS_LENGTH: usize = 20;

/// Domain separation tag appended to public key registration messages.
pub const REGISTRATION_DOMAIN: &[u8] = b"0G_BN254_Pubkey_Registration";

/// Left-pads the chain identifier to 32 big-endian bytes.
fn chain_id_bytes(chain_id: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&chain_id.to_be_bytes());
    bytes
}

/// Returns the message signed to prove possession of a key: `address || chain_id || domain`.
pub fn registration_message(address: &[u8; ADDRESS_LENGTH], chain_id: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(ADDRESS_LENGTH + 32 + REGISTRATION_DOMAIN.len());
    message.extend_from_slice(address);
    message.extend_from_slice(&chain_id_bytes(chain_id));
    message.extend_from_slice(REGISTRATION_DOMAIN);
    message
}

/// Returns the message signed to register for an epoch: `address || epoch || chain_id`.
pub fn epoch_registration_message(
    address: &[u8; ADDRESS_LENGTH],
    epoch: u64,
    chain_id: u64,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(ADDRESS_LENGTH + 8 + 32);
    message.extend_from_slice(address);
    message.extend_from_slice(&epoch.to_be_bytes());
    message.extend_from_slice(&chain_id_bytes(chain_id));
    message
}

/// Hashes `message` with Keccak-256 and maps the digest to G1.
pub fn hash_message(message: &[u8]) -> G1 {
    map_to_curve(&Keccak256::hash(message))
}

/// Returns the G1 point a signer signs to register its public keys.
pub fn registration_hash(address: &[u8; ADDRESS_LENGTH], chain_id: u64) -> G1 {
    hash_message(&registration_message(address, chain_id))
}

/// Returns the G1 point a signer signs to register for `epoch`.
pub fn epoch_registration_hash(address: &[u8; ADDRESS_LENGTH], epoch: u64, chain_id: u64) -> G1 {
    hash_message(&epoch_registration_message(address, epoch, chain_id))
}

/// Derives the challenge scalar `gamma = keccak256(hash || signature || pk1 || pk2) mod r`.
pub fn gamma(hash: &G1, signature: &G1, public_g1: &G1, public_g2: &G2) -> Scalar {
    let mut hasher = Keccak256::new();
    hasher.update(&hash.encode());
    hasher.update(&signature.encode());
    hasher.update(&public_g1.encode());
    hasher.update(&public_g2.encode());
    Scalar::from_be_bytes_mod_order(&hasher.finalize())
}

/// Verifies that `signature` signs `hash` under `public_g2` and that `public_g1` and
/// `public_g2` share the same secret.
///
/// Checks `e(signature + gamma * pk1, -G2) * e(hash + gamma * G1, pk2) == 1`.
///
/// Identity keys and signatures are rejected (they would satisfy the equation for any hash).
pub fn verify(hash: &G1, signature: &G1, public_g1: &G1, public_g2: &G2) -> bool {
    if public_g1.is_zero() || public_g2.is_zero() || signature.is_zero() {
        return false;
    }
    let gamma = gamma(hash, signature, public_g1, public_g2);

    // signature + gamma * pk1
    let mut left = *public_g1;
    left.mul(&gamma);
    left.add(signature);

    // hash + gamma * G1
    let mut right = G1::one();
    right.mul(&gamma);
    right.add(hash);

    pairing_check(&[left, right], &[neg_g2(&G2::one()), *public_g2]).unwrap_or(false)
}

/// Combines multiple G1 public keys into an aggregate public key.
///
/// # Warning
///
/// This function assumes every key was registered with a verified proof-of-possession and
/// that each key appears once. Summing unverified keys allows rogue-key attacks.
pub fn aggregate_public_keys<'a, I>(public_keys: I) -> G1
where
    I: IntoIterator<Item = &'a G1>,
{
    let mut aggregate = G1::zero();
    for public in public_keys {
        aggregate.add(public);
    }
    aggregate
}
