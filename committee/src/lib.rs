//! Form stake-weighted committees of data-availability signers and aggregate their public keys.
//!
//! Signers register BN254 keys with a proof-of-possession, then register for the next epoch
//! with a signature that seeds their ballots. At every epoch boundary the [Keeper] ranks all
//! ballots, splits them into fixed-width quorums, and stores them. Verifiers later ask for the
//! aggregate G1 key of any subset of a quorum.
//!
//! # Status
//!
//! `dasigners-committee` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.

pub mod contract;
mod error;
pub mod events;
pub mod genesis;
pub mod keeper;
pub mod keys;
pub mod msg;
pub mod partition;
pub mod sortition;
pub mod stake;
pub mod types;

pub use error::Error;
pub use events::Event;
pub use keeper::{Config, Keeper};
