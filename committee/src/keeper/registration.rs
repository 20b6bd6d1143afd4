//! Registrations for the committee of the next epoch.

use super::{decode_entry, Keeper};
use crate::{
    keys,
    msg::RegisterNextEpoch,
    stake::StakeOracle,
    types::{Account, Registration},
    Error,
};
use commonware_codec::DecodeExt;
use dasigners_cryptography::bn254::{group::G1, ops};
use dasigners_storage::StoreMut;
use tracing::debug;

impl<S: StoreMut, O: StakeOracle> Keeper<S, O> {
    /// Registers an existing signer for the committee of the epoch after the active one.
    ///
    /// A later registration for the same epoch replaces the earlier one.
    pub fn register_next_epoch(&mut self, msg: &RegisterNextEpoch) -> Result<(), Error> {
        msg.validate_basic()?;
        let account = Account::try_from(msg.account.as_slice())?;
        let signer = self
            .get_signer(&account)?
            .ok_or(Error::SignerNotFound(account))?;
        let params = self.params()?;
        if self.votes(&params, &account) == 0 {
            debug!(%account, "insufficient bonded stake");
            return Err(Error::InsufficientBonded(account));
        }

        let epoch = self.epoch_number()? + 1;
        let Ok(signature) = G1::decode(msg.signature.as_slice()) else {
            debug!(%account, epoch, "undecodable signature");
            return Err(Error::InvalidSignature);
        };
        let hash = ops::epoch_registration_hash(account.as_bytes(), epoch, self.config.chain_id);
        if !ops::verify(&hash, &signature, &signer.pubkey_g1, &signer.pubkey_g2) {
            debug!(%account, epoch, "invalid epoch registration signature");
            return Err(Error::InvalidSignature);
        }

        self.store
            .set_encoded(keys::registration(epoch, &account), &signature)?;
        debug!(%account, epoch, "registered for epoch");
        Ok(())
    }

    /// Returns the registration signature of `account` for `epoch`, if any.
    pub fn registration(&self, epoch: u64, account: &Account) -> Result<Option<G1>, Error> {
        Ok(self
            .store
            .get_decoded::<G1>(&keys::registration(epoch, account), &())?)
    }

    /// Returns every registration for `epoch`, ordered by account.
    pub fn registrations(&self, epoch: u64) -> Result<Vec<Registration>, Error> {
        self.collect_registrations(&keys::registrations(epoch))
    }

    /// Returns every stored registration, ordered by epoch then account.
    pub fn all_registrations(&self) -> Result<Vec<Registration>, Error> {
        self.collect_registrations(&keys::all_registrations())
    }

    fn collect_registrations(&self, prefix: &[u8]) -> Result<Vec<Registration>, Error> {
        self.store
            .scan(prefix)?
            .into_iter()
            .map(|(key, value)| {
                let (epoch, account) = keys::parse_registration(&key)
                    .ok_or(Error::Corrupted("registration key"))?;
                let signature = decode_entry::<G1>(&key, &value, &())?;
                Ok(Registration {
                    epoch,
                    account,
                    signature,
                })
            })
            .collect()
    }
}
