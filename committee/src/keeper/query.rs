//! Read-only queries over stored quorums.

use super::{Keeper, QUORUM_CFG};
use crate::{
    keys,
    stake::StakeOracle,
    types::{Account, AggregatePubkey, Quorum},
    Error,
};
use commonware_codec::varint::UInt;
use dasigners_cryptography::bn254::ops;
use dasigners_storage::StoreMut;
use std::collections::BTreeSet;

impl<S: StoreMut, O: StakeOracle> Keeper<S, O> {
    /// Returns the number of quorums formed for `epoch`.
    pub fn quorum_count(&self, epoch: u64) -> Result<u64, Error> {
        self.store
            .get_decoded::<UInt<u64>>(&keys::quorum_count(epoch), &())?
            .map(Into::into)
            .ok_or(Error::QuorumNotFound(epoch))
    }

    /// Returns quorum `quorum_id` of `epoch`.
    pub fn quorum(&self, epoch: u64, quorum_id: u64) -> Result<Quorum, Error> {
        let count = self.quorum_count(epoch)?;
        if quorum_id >= count {
            return Err(Error::QuorumIdOutOfBound(epoch, quorum_id));
        }
        self.store
            .get_decoded::<Quorum>(&keys::quorum(epoch, quorum_id), &QUORUM_CFG)?
            .ok_or(Error::Corrupted("missing quorum"))
    }

    /// Returns the account holding seat `row` of a quorum.
    pub fn quorum_row(&self, epoch: u64, quorum_id: u64, row: u32) -> Result<Account, Error> {
        let quorum = self.quorum(epoch, quorum_id)?;
        quorum
            .signers
            .get(row as usize)
            .copied()
            .ok_or(Error::RowIndexOutOfBound(row))
    }

    /// Sums the G1 keys of the signers selected by `bitmap`.
    ///
    /// Bit `i` (least significant bit first within each byte) selects seat `i`. A signer holding
    /// several seats contributes its key once, whichever of its seats are set. Bits past the
    /// last seat are ignored.
    pub fn aggregate_pubkey_g1(
        &self,
        epoch: u64,
        quorum_id: u64,
        bitmap: &[u8],
    ) -> Result<AggregatePubkey, Error> {
        let quorum = self.quorum(epoch, quorum_id)?;
        let expected = quorum.len().div_ceil(8);
        if bitmap.len() != expected {
            return Err(Error::BitmapLengthMismatch(expected, bitmap.len()));
        }

        let mut distinct = BTreeSet::new();
        let mut selected = BTreeSet::new();
        for (seat, account) in quorum.signers.iter().enumerate() {
            distinct.insert(*account);
            if bitmap[seat / 8] & (1 << (seat % 8)) != 0 {
                selected.insert(*account);
            }
        }

        let mut keys = Vec::with_capacity(selected.len());
        for account in &selected {
            let signer = self
                .get_signer(account)?
                .ok_or(Error::Corrupted("quorum member not registered"))?;
            keys.push(signer.pubkey_g1);
        }
        Ok(AggregatePubkey {
            aggregate: ops::aggregate_public_keys(&keys),
            total: distinct.len() as u64,
            hit: selected.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::{tests::*, Keeper};
    use crate::{
        keys,
        stake::Ledger,
        types::{Params, Quorum},
        Error,
    };
    use commonware_codec::varint::UInt;
    use dasigners_cryptography::bn254::group::{Element, G1};
    use dasigners_storage::{Memory, StoreMut};

    fn params() -> Params {
        Params {
            tokens_per_vote: 10,
            max_votes_per_signer: 8,
            max_quorums: 10,
            encoded_slices: 10,
            epoch_blocks: 10,
        }
    }

    /// Registers signers 1..=3 and stores a hand-built quorum for epoch 0.
    fn with_quorum(seats: &[u8]) -> Keeper<Memory, Ledger> {
        let mut keeper = keeper(params());
        for i in 1..=3 {
            bond(&mut keeper, i, 100);
            keeper.register_signer(&register_msg(i, "s")).unwrap();
        }
        let quorum = Quorum {
            signers: seats.iter().map(|i| account(*i)).collect(),
        };
        keeper
            .store
            .set_encoded(keys::quorum(0, 0), &quorum)
            .unwrap();
        keeper
            .store
            .set_encoded(keys::quorum_count(0), &UInt(1u64))
            .unwrap();
        keeper
    }

    #[test]
    fn test_quorum_lookup() {
        let keeper = with_quorum(&[1, 2, 3, 1]);
        assert_eq!(keeper.quorum(0, 0).unwrap().len(), 4);
        assert!(matches!(
            keeper.quorum(0, 1),
            Err(Error::QuorumIdOutOfBound(0, 1))
        ));
        assert!(matches!(keeper.quorum(5, 0), Err(Error::QuorumNotFound(5))));
        assert_eq!(keeper.quorum_row(0, 0, 2).unwrap(), account(3));
        assert!(matches!(
            keeper.quorum_row(0, 0, 4),
            Err(Error::RowIndexOutOfBound(4))
        ));
    }

    #[test]
    fn test_aggregate_all() {
        let keeper = with_quorum(&[1, 2, 3, 1, 2, 1, 1, 1, 1, 3]);
        let result = keeper.aggregate_pubkey_g1(0, 0, &[0xff, 0x03]).unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.hit, 3);

        let mut expected = G1::zero();
        for i in 1..=3 {
            expected.add(&key(i).public_g1());
        }
        assert_eq!(result.aggregate, expected);
    }

    #[test]
    fn test_aggregate_duplicate_seats() {
        // Seats 0 and 3 belong to signer 1: its key counts once
        let keeper = with_quorum(&[1, 2, 3, 1]);
        let result = keeper.aggregate_pubkey_g1(0, 0, &[0b1001]).unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.hit, 1);
        assert_eq!(result.aggregate, key(1).public_g1());
    }

    #[test]
    fn test_aggregate_empty_bitmap() {
        let keeper = with_quorum(&[1, 2, 3, 1]);
        let result = keeper.aggregate_pubkey_g1(0, 0, &[0]).unwrap();
        assert_eq!(result.hit, 0);
        assert_eq!(result.aggregate, G1::zero());
    }

    #[test]
    fn test_aggregate_ignores_padding_bits() {
        let keeper = with_quorum(&[1, 2, 3, 1]);
        let result = keeper.aggregate_pubkey_g1(0, 0, &[0b1111_0010]).unwrap();
        assert_eq!(result.hit, 1);
        assert_eq!(result.aggregate, key(2).public_g1());
    }

    #[test]
    fn test_aggregate_bitmap_length() {
        let keeper = with_quorum(&[1, 2, 3, 1, 2, 3, 1, 2, 3]);
        assert!(matches!(
            keeper.aggregate_pubkey_g1(0, 0, &[0xff]),
            Err(Error::BitmapLengthMismatch(2, 1))
        ));
        assert!(matches!(
            keeper.aggregate_pubkey_g1(0, 0, &[0xff, 0xff, 0xff]),
            Err(Error::BitmapLengthMismatch(2, 3))
        ));
    }

    #[test]
    fn test_aggregate_unregistered_member() {
        let keeper = with_quorum(&[1, 9]);
        let err = keeper.aggregate_pubkey_g1(0, 0, &[0b10]).unwrap_err();
        assert!(err.is_fatal());
    }
}
