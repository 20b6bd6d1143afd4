//! Genesis import and export.

use super::{write_epoch_number, Keeper};
use crate::{
    genesis::{GenesisRegistration, GenesisSigner, GenesisState},
    keys,
    stake::StakeOracle,
    Error,
};
use commonware_codec::varint::UInt;
use dasigners_storage::StoreMut;
use tracing::{error, info};

impl<S: StoreMut, O: StakeOracle> Keeper<S, O> {
    /// Writes `genesis` into the store in a single batch.
    ///
    /// The store must be empty.
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> Result<(), Error> {
        if !self.store.scan(&[])?.is_empty() {
            return Err(Error::InvalidGenesis("store is not empty".to_string()));
        }
        let decoded = genesis.decode()?;
        let changes = {
            let mut batch = self.store.start_batch();
            batch.set_encoded(keys::params(), &genesis.params)?;
            write_epoch_number(&mut batch, genesis.epoch_number)?;
            for signer in &decoded.signers {
                batch.set_encoded(keys::signer(&signer.account), signer)?;
            }
            for (epoch, quorums) in genesis.quorums_by_epoch.iter().enumerate() {
                let epoch = epoch as u64;
                for (id, quorum) in quorums.iter().enumerate() {
                    batch.set_encoded(keys::quorum(epoch, id as u64), quorum)?;
                }
                batch.set_encoded(keys::quorum_count(epoch), &UInt(quorums.len() as u64))?;
            }
            for registration in &decoded.registrations {
                batch.set_encoded(
                    keys::registration(registration.epoch, &registration.account),
                    &registration.signature,
                )?;
            }
            batch.into_changes()
        };
        self.store.write_batch(changes)?;
        info!(
            epoch = genesis.epoch_number,
            signers = decoded.signers.len(),
            registrations = decoded.registrations.len(),
            "initialized genesis"
        );
        Ok(())
    }

    /// Reads the complete state, including the quorums of every epoch up to the active one.
    ///
    /// Returns [Error::MissingHistory] if any epoch has no stored quorums.
    pub fn export_genesis(&self) -> Result<GenesisState, Error> {
        let params = self.params()?;
        let epoch_number = self.epoch_number()?;
        let signers = self.signers()?.iter().map(GenesisSigner::from).collect();

        let mut quorums_by_epoch = Vec::new();
        for epoch in 0..=epoch_number {
            let count = match self.quorum_count(epoch) {
                Ok(count) => count,
                Err(Error::QuorumNotFound(_)) => {
                    error!(epoch, "missing quorum history");
                    return Err(Error::MissingHistory(epoch));
                }
                Err(err) => return Err(err),
            };
            let quorums = (0..count)
                .map(|id| self.quorum(epoch, id))
                .collect::<Result<Vec<_>, _>>()?;
            quorums_by_epoch.push(quorums);
        }

        let registrations = self
            .all_registrations()?
            .iter()
            .map(GenesisRegistration::from)
            .collect();
        Ok(GenesisState {
            params,
            epoch_number,
            signers,
            quorums_by_epoch,
            registrations,
        })
    }
}
