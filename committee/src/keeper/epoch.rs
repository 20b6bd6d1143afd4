//! Epoch transitions.

use super::{write_epoch_number, Keeper};
use crate::{
    events::Event,
    keys,
    partition::partition,
    sortition::{generate_ballots, Ballot, Candidate},
    stake::StakeOracle,
    types::{Params, Quorum},
    Error,
};
use commonware_codec::{varint::UInt, Encode};
use dasigners_storage::StoreMut;
use tracing::{error, info};

impl<S: StoreMut, O: StakeOracle> Keeper<S, O> {
    /// Advances the epoch if `height` starts a new one.
    ///
    /// Heights must advance so that the epoch grows by at most one per call. Any other jump
    /// returns [Error::NonContiguousEpoch], which is fatal: the host must halt.
    pub fn begin_block(&mut self, height: u64) -> Result<(), Error> {
        let params = self.params()?;
        let stored = self.epoch_number()?;
        let expected = params.epoch_at(height);
        if expected == stored {
            return Ok(());
        }
        if stored.checked_add(1) != Some(expected) {
            error!(height, stored, expected, "non-contiguous epoch");
            return Err(Error::NonContiguousEpoch { stored, expected });
        }

        let ballots = self.ballots(expected, &params)?;
        let quorums = quorums_from_ballots(&ballots, &params);
        let changes = {
            let mut batch = self.store.start_batch();
            for (id, quorum) in quorums.iter().enumerate() {
                batch.set_encoded(keys::quorum(expected, id as u64), quorum)?;
            }
            batch.set_encoded(keys::quorum_count(expected), &UInt(quorums.len() as u64))?;
            write_epoch_number(&mut batch, expected)?;
            batch.into_changes()
        };
        self.store.write_batch(changes)?;

        info!(
            epoch = expected,
            ballots = ballots.len(),
            quorums = quorums.len(),
            "entered epoch"
        );
        self.events.push(Event::EpochTransitioned {
            epoch: expected,
            ballots: ballots.len() as u64,
            quorums: quorums.len() as u64,
        });
        Ok(())
    }

    /// Returns the ranked ballots for `epoch` from its registrations and current stake.
    pub fn ballots(&self, epoch: u64, params: &Params) -> Result<Vec<Ballot>, Error> {
        let candidates = self
            .registrations(epoch)?
            .into_iter()
            .map(|registration| Candidate {
                account: registration.account,
                signature: registration.signature.encode().to_vec(),
                weight: self.oracle.bonded_weight(&registration.account),
            })
            .collect::<Vec<_>>();
        Ok(generate_ballots(
            candidates,
            params.tokens_per_vote,
            params.max_votes_per_signer,
        ))
    }

    /// Computes (without storing) the quorums `epoch` would receive from the current
    /// registrations and stake.
    pub fn compute_quorums(&self, epoch: u64) -> Result<Vec<Quorum>, Error> {
        let params = self.params()?;
        let ballots = self.ballots(epoch, &params)?;
        Ok(quorums_from_ballots(&ballots, &params))
    }
}

fn quorums_from_ballots(ballots: &[Ballot], params: &Params) -> Vec<Quorum> {
    let max_quorums = usize::try_from(params.max_quorums).unwrap_or(usize::MAX);
    partition(ballots, params.quorum_width(), max_quorums)
}
