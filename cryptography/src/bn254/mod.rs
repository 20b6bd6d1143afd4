//! BN254 signatures with proof-of-possession.
//!
//! Signers hold one secret scalar `sk` and publish it in both groups (`pk1 = sk * G1` and
//! `pk2 = sk * G2`). Messages are hashed to G1 and signed as `sig = sk * H(m)`.
//!
//! Verification ([ops::verify]) batches two checks into a single pairing: that `sig` is a valid
//! signature over `H(m)` under `pk2`, and that `pk1` and `pk2` encode the same secret. Binding the
//! G1 key to the G2 key is what allows G1 keys to be summed safely when building aggregate keys
//! (rogue-key substitution requires a G1 key with no matching G2 key).
//!
//! # Example
//!
//! ```rust
//! use dasigners_cryptography::{
//!     bn254::{ops, PrivateKey},
//!     PrivateKeyExt,
//! };
//!
//! let signer = PrivateKey::from_seed(0);
//! let account = [7u8; 20];
//! let chain_id = 16_600;
//!
//! // Prove possession of the key
//! let hash = ops::registration_hash(&account, chain_id);
//! let signature = signer.sign_hash(&hash);
//! assert!(ops::verify(&hash, &signature, &signer.public_g1(), &signer.public_g2()));
//! ```

pub mod group;
pub mod ops;
mod scheme;
pub use scheme::PrivateKey;

use thiserror::Error;

/// Errors that can occur when working with BN254 primitives.
#[derive(Error, Debug)]
pub enum Error {
    #[error("pairing inputs have different lengths: {0} != {1}")]
    PairingLengthMismatch(usize, usize),
}
