//! Events emitted by the engine during block execution.

use crate::types::Account;
use dasigners_cryptography::bn254::group::{G1, G2};

/// A typed event, drained by the host once per block with
/// [Keeper::drain_events](crate::keeper::Keeper::drain_events).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A signer registered or changed its socket.
    SignerUpdated {
        account: Account,
        socket: String,
        pubkey_g1: G1,
        pubkey_g2: G2,
    },

    /// The engine moved to a new epoch and stored its quorums.
    EpochTransitioned {
        epoch: u64,
        ballots: u64,
        quorums: u64,
    },
}
