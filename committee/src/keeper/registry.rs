//! Signer registration and lookup.

use super::{decode_entry, Keeper};
use crate::{
    events::Event,
    keys,
    msg::{RegisterSigner, UpdateSocket},
    stake::StakeOracle,
    types::{Account, Signer},
    Error,
};
use commonware_codec::DecodeExt;
use dasigners_cryptography::bn254::{
    group::{G1, G2},
    ops,
};
use dasigners_storage::StoreMut;
use tracing::{debug, info};

impl<S: StoreMut, O: StakeOracle> Keeper<S, O> {
    /// Registers a new signer after checking stake and proof-of-possession.
    pub fn register_signer(&mut self, msg: &RegisterSigner) -> Result<(), Error> {
        msg.validate_basic()?;
        let account = Account::try_from(msg.account.as_slice())?;
        if self.is_signer(&account)? {
            debug!(%account, "signer already exists");
            return Err(Error::SignerExists(account));
        }
        let params = self.params()?;
        if self.votes(&params, &account) == 0 {
            debug!(%account, "insufficient bonded stake");
            return Err(Error::InsufficientBonded(account));
        }

        // Keys that fail to decode cannot carry a valid proof
        let (Ok(pubkey_g1), Ok(pubkey_g2), Ok(signature)) = (
            G1::decode(msg.pubkey_g1.as_slice()),
            G2::decode(msg.pubkey_g2.as_slice()),
            G1::decode(msg.signature.as_slice()),
        ) else {
            debug!(%account, "undecodable registration");
            return Err(Error::InvalidSignature);
        };
        let hash = ops::registration_hash(account.as_bytes(), self.config.chain_id);
        if !ops::verify(&hash, &signature, &pubkey_g1, &pubkey_g2) {
            debug!(%account, "invalid proof-of-possession");
            return Err(Error::InvalidSignature);
        }

        let signer = Signer {
            account,
            socket: msg.socket.clone(),
            pubkey_g1,
            pubkey_g2,
        };
        self.store.set_encoded(keys::signer(&account), &signer)?;
        info!(%account, socket = %signer.socket, "registered signer");
        self.emit_signer_updated(signer);
        Ok(())
    }

    /// Replaces the socket of an existing signer.
    pub fn update_socket(&mut self, msg: &UpdateSocket) -> Result<(), Error> {
        msg.validate_basic()?;
        let account = Account::try_from(msg.account.as_slice())?;
        let mut signer = self
            .get_signer(&account)?
            .ok_or(Error::SignerNotFound(account))?;
        signer.socket = msg.socket.clone();
        self.store.set_encoded(keys::signer(&account), &signer)?;
        debug!(%account, socket = %signer.socket, "updated socket");
        self.emit_signer_updated(signer);
        Ok(())
    }

    fn emit_signer_updated(&mut self, signer: Signer) {
        self.events.push(Event::SignerUpdated {
            account: signer.account,
            socket: signer.socket,
            pubkey_g1: signer.pubkey_g1,
            pubkey_g2: signer.pubkey_g2,
        });
    }

    /// Returns the signer registered under `account`.
    pub fn get_signer(&self, account: &Account) -> Result<Option<Signer>, Error> {
        Ok(self
            .store
            .get_decoded::<Signer>(&keys::signer(account), &())?)
    }

    /// Returns true if `account` is a registered signer.
    pub fn is_signer(&self, account: &Account) -> Result<bool, Error> {
        Ok(self.store.get(&keys::signer(account))?.is_some())
    }

    /// Returns every registered signer, ordered by account.
    pub fn signers(&self) -> Result<Vec<Signer>, Error> {
        self.store
            .scan(&keys::signers())?
            .into_iter()
            .map(|(key, value)| decode_entry::<Signer>(&key, &value, &()))
            .collect()
    }
}
