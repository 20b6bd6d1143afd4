//! Stateful committee engine.
//!
//! The [Keeper] owns a [Store] holding every signer, registration, and quorum, plus a
//! [StakeOracle] consulted for bonded weight. It is driven by the host once per block:
//! commands ([Keeper::register_signer], [Keeper::register_next_epoch], [Keeper::update_socket])
//! mutate state as transactions execute, and [Keeper::begin_block] advances the epoch.
//!
//! Reads never mutate state. Writes are never concurrent with each other.

use crate::{
    events::Event,
    keys,
    sortition,
    stake::StakeOracle,
    types::{Account, Params, MAX_QUORUM_WIDTH},
    Error,
};
use commonware_codec::{varint::UInt, Decode, Read};
use commonware_utils::hex;
use dasigners_storage::{Store, StoreMut};
use tracing::debug;

mod epoch;
mod genesis;
mod query;
mod registration;
mod registry;

/// Immutable, per-process configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Identifier of the chain, bound into every registration message.
    pub chain_id: u64,
}

/// The committee engine.
pub struct Keeper<S: StoreMut, O: StakeOracle> {
    config: Config,
    store: S,
    oracle: O,
    events: Vec<Event>,
}

impl<S: StoreMut, O: StakeOracle> Keeper<S, O> {
    /// Create a keeper over `store`.
    ///
    /// The store must already hold params and an epoch number (see [crate::genesis]) before
    /// blocks are processed.
    pub fn new(config: Config, store: S, oracle: O) -> Self {
        Self {
            config,
            store,
            oracle,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the stake oracle (for hosts that own the ledger).
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Returns and clears the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Returns the current parameters.
    pub fn params(&self) -> Result<Params, Error> {
        self.store
            .get_decoded::<Params>(&keys::params(), &())?
            .ok_or(Error::ParamsNotSet)
    }

    /// Replaces the parameters.
    ///
    /// This is the governance entry point: hosts call it only from their parameter-change path.
    pub fn set_params(&mut self, params: Params) -> Result<(), Error> {
        params.validate()?;
        self.store.set_encoded(keys::params(), &params)?;
        debug!(?params, "updated params");
        Ok(())
    }

    /// Returns the active epoch.
    pub fn epoch_number(&self) -> Result<u64, Error> {
        read_epoch_number(&self.store)
    }

    /// Returns the weight of `account` in votes under `params`.
    fn votes(&self, params: &Params, account: &Account) -> u64 {
        sortition::votes(
            self.oracle.bonded_weight(account),
            params.tokens_per_vote,
            params.max_votes_per_signer,
        )
    }
}

/// Quorum codec bound used for every stored quorum.
const QUORUM_CFG: usize = MAX_QUORUM_WIDTH;

/// Decodes a value returned by a prefix scan.
fn decode_entry<V: Read>(key: &[u8], value: &[u8], cfg: &V::Cfg) -> Result<V, Error> {
    V::decode_cfg(value, cfg).map_err(|source| {
        Error::Storage(dasigners_storage::Error::Corrupted {
            key: hex(key),
            source,
        })
    })
}

fn read_epoch_number(store: &impl Store) -> Result<u64, Error> {
    store
        .get_decoded::<UInt<u64>>(&keys::epoch_number(), &())?
        .map(Into::into)
        .ok_or(Error::EpochNumberNotSet)
}

fn write_epoch_number(store: &mut impl StoreMut, epoch: u64) -> Result<(), Error> {
    store.set_encoded(keys::epoch_number(), &UInt(epoch))?;
    Ok(())
}
