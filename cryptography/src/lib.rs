//! Generate BN254 keys, sign registration messages, and deterministically verify
//! proof-of-possession signatures.
//!
//! # Status
//!
//! `dasigners-cryptography` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.

use rand::{CryptoRng, Rng, SeedableRng};

pub mod bn254;
pub mod keccak256;
pub use keccak256::{keccak256, Keccak256};

/// Size (in bytes) of a digest produced by [Hasher]s in this crate.
pub const DIGEST_LENGTH: usize = 32;

/// A 32-byte digest.
pub type Digest = [u8; DIGEST_LENGTH];

/// Interface used for hashing arbitrary messages into a [Digest].
///
/// Implementations reset their internal state after every call to `finalize`,
/// so a single hasher can be reused across many messages.
pub trait Hasher: Clone + Send + Sync + 'static {
    /// Create a new hasher.
    fn new() -> Self;

    /// Append message to previously recorded data.
    fn update(&mut self, message: &[u8]);

    /// Hash all recorded data and reset the hasher
    /// to the initial state.
    fn finalize(&mut self) -> Digest;

    /// Reset the hasher without generating a hash.
    ///
    /// This function does not need to be called after `finalize`.
    fn reset(&mut self);

    /// Hash a single message.
    fn hash(message: &[u8]) -> Digest {
        let mut hasher = Self::new();
        hasher.update(message);
        hasher.finalize()
    }
}

/// A private key that can be generated from a seed or RNG.
pub trait PrivateKeyExt: Sized {
    /// Create a private key from a seed.
    ///
    /// # Warning
    ///
    /// This function is insecure and should only be used for examples
    /// and testing.
    fn from_seed(seed: u64) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self::from_rng(&mut rng)
    }

    /// Create a fresh private key using the supplied RNG.
    fn from_rng<R: Rng + CryptoRng>(rng: &mut R) -> Self;
}
