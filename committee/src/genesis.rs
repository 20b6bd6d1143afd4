//! Genesis import and export format.
//!
//! A genesis file is JSON. Accounts and points are lowercase hex strings.
//!
//! ```json
//! {
//!   "params": { "tokens_per_vote": 10, ... },
//!   "epoch_number": 0,
//!   "signers": [],
//!   "quorums_by_epoch": [[]],
//!   "registrations": []
//! }
//! ```
//!
//! `quorums_by_epoch[e]` holds the quorums of epoch `e`, so the history always has exactly
//! `epoch_number + 1` entries (it includes the active epoch).

use crate::{
    types::{Account, Params, Quorum, Registration, Signer, MAX_QUORUM_WIDTH, MAX_SOCKET_LENGTH},
    Error,
};
use commonware_codec::{Decode, Encode, Read};
use commonware_utils::{from_hex_formatted, hex};
use dasigners_cryptography::bn254::group::{G1, G2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A signer as it appears in a genesis file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisSigner {
    pub account: Account,
    pub socket: String,
    pub pubkey_g1: String,
    pub pubkey_g2: String,
}

impl From<&Signer> for GenesisSigner {
    fn from(signer: &Signer) -> Self {
        Self {
            account: signer.account,
            socket: signer.socket.clone(),
            pubkey_g1: hex(&signer.pubkey_g1.encode()),
            pubkey_g2: hex(&signer.pubkey_g2.encode()),
        }
    }
}

impl GenesisSigner {
    /// Decodes the signer's keys.
    pub fn to_signer(&self) -> Result<Signer, Error> {
        if self.socket.len() > MAX_SOCKET_LENGTH {
            return Err(invalid(format!("socket of {} too long", self.account)));
        }
        Ok(Signer {
            account: self.account,
            socket: self.socket.clone(),
            pubkey_g1: decode_point::<G1>(&self.pubkey_g1, "pubkey_g1", &self.account)?,
            pubkey_g2: decode_point::<G2>(&self.pubkey_g2, "pubkey_g2", &self.account)?,
        })
    }
}

/// A registration as it appears in a genesis file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRegistration {
    pub epoch: u64,
    pub account: Account,
    pub signature: String,
}

impl From<&Registration> for GenesisRegistration {
    fn from(registration: &Registration) -> Self {
        Self {
            epoch: registration.epoch,
            account: registration.account,
            signature: hex(&registration.signature.encode()),
        }
    }
}

impl GenesisRegistration {
    pub fn to_registration(&self) -> Result<Registration, Error> {
        Ok(Registration {
            epoch: self.epoch,
            account: self.account,
            signature: decode_point::<G1>(&self.signature, "signature", &self.account)?,
        })
    }
}

/// Complete engine state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub epoch_number: u64,
    pub signers: Vec<GenesisSigner>,
    pub quorums_by_epoch: Vec<Vec<Quorum>>,
    #[serde(default)]
    pub registrations: Vec<GenesisRegistration>,
}

impl Default for GenesisState {
    /// Epoch 0 with no signers and no quorums.
    fn default() -> Self {
        Self {
            params: Params::default(),
            epoch_number: 0,
            signers: Vec::new(),
            quorums_by_epoch: vec![Vec::new()],
            registrations: Vec::new(),
        }
    }
}

/// Decoded genesis contents, ready to be written.
pub(crate) struct Decoded {
    pub signers: Vec<Signer>,
    pub registrations: Vec<Registration>,
}

impl GenesisState {
    /// Parses a genesis file.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|err| invalid(err.to_string()))
    }

    /// Serializes the state as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|err| invalid(err.to_string()))
    }

    /// Checks that the state can be imported.
    pub fn validate(&self) -> Result<(), Error> {
        self.decode().map(|_| ())
    }

    pub(crate) fn decode(&self) -> Result<Decoded, Error> {
        self.params
            .validate()
            .map_err(|err| invalid(err.to_string()))?;

        let mut registered = BTreeSet::new();
        let mut signers = Vec::with_capacity(self.signers.len());
        for signer in &self.signers {
            if !registered.insert(signer.account) {
                return Err(invalid(format!("duplicate signer {}", signer.account)));
            }
            signers.push(signer.to_signer()?);
        }

        let expected = self
            .epoch_number
            .checked_add(1)
            .ok_or_else(|| invalid("epoch number overflow".to_string()))?;
        if self.quorums_by_epoch.len() as u64 != expected {
            return Err(invalid(format!(
                "epoch history has {} entries, expected {expected}",
                self.quorums_by_epoch.len()
            )));
        }
        for (epoch, quorums) in self.quorums_by_epoch.iter().enumerate() {
            for quorum in quorums {
                if quorum.len() > MAX_QUORUM_WIDTH {
                    return Err(invalid(format!("quorum at epoch {epoch} too wide")));
                }
                if let Some(missing) = quorum.signers.iter().find(|a| !registered.contains(*a)) {
                    return Err(invalid(format!(
                        "historical signer {missing} missing at epoch {epoch}"
                    )));
                }
            }
        }

        let mut registrations = Vec::with_capacity(self.registrations.len());
        for registration in &self.registrations {
            if !registered.contains(&registration.account) {
                return Err(invalid(format!(
                    "registration from unknown signer {}",
                    registration.account
                )));
            }
            if registration.epoch > expected {
                return Err(invalid(format!(
                    "registration of {} for future epoch {}",
                    registration.account, registration.epoch
                )));
            }
            registrations.push(registration.to_registration()?);
        }

        Ok(Decoded {
            signers,
            registrations,
        })
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidGenesis(reason)
}

fn decode_point<P: Read<Cfg = ()>>(
    value: &str,
    field: &str,
    account: &Account,
) -> Result<P, Error> {
    let bytes = from_hex_formatted(value)
        .ok_or_else(|| invalid(format!("{field} of {account} is not hex")))?;
    P::decode_cfg(bytes.as_slice(), &())
        .map_err(|err| invalid(format!("{field} of {account}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dasigners_cryptography::{bn254::PrivateKey, PrivateKeyExt};

    fn signer(i: u8) -> GenesisSigner {
        let key = PrivateKey::from_seed(i as u64);
        GenesisSigner::from(&Signer {
            account: Account::new([i; 20]),
            socket: format!("10.0.0.{i}:9000"),
            pubkey_g1: key.public_g1(),
            pubkey_g2: key.public_g2(),
        })
    }

    fn state() -> GenesisState {
        GenesisState {
            params: Params::default(),
            epoch_number: 1,
            signers: vec![signer(1), signer(2)],
            quorums_by_epoch: vec![
                vec![],
                vec![Quorum {
                    signers: vec![Account::new([1; 20]), Account::new([2; 20])],
                }],
            ],
            registrations: vec![],
        }
    }

    #[test]
    fn test_default_is_valid() {
        let genesis = GenesisState::default();
        genesis.validate().unwrap();
        assert_eq!(genesis.quorums_by_epoch.len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let genesis = state();
        let json = genesis.to_json().unwrap();
        assert_eq!(GenesisState::from_json(&json).unwrap(), genesis);
        genesis.validate().unwrap();
    }

    #[test]
    fn test_registrations_optional() {
        let mut value = serde_json::to_value(state()).unwrap();
        value.as_object_mut().unwrap().remove("registrations");
        let genesis: GenesisState = serde_json::from_value(value).unwrap();
        assert!(genesis.registrations.is_empty());
    }

    #[test]
    fn test_history_length() {
        let mut genesis = state();
        genesis.epoch_number = 2;
        assert!(matches!(genesis.validate(), Err(Error::InvalidGenesis(_))));
    }

    #[test]
    fn test_missing_historical_signer() {
        let mut genesis = state();
        genesis.signers.pop();
        assert!(matches!(genesis.validate(), Err(Error::InvalidGenesis(_))));
    }

    #[test]
    fn test_duplicate_signer() {
        let mut genesis = state();
        genesis.signers.push(signer(1));
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_undecodable_key() {
        let mut genesis = state();
        genesis.signers[0].pubkey_g1 = "ff".repeat(64);
        assert!(genesis.validate().is_err());
        genesis.signers[0].pubkey_g1 = "zz".to_string();
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_unknown_registration() {
        let mut genesis = state();
        genesis.registrations.push(GenesisRegistration {
            epoch: 2,
            account: Account::new([3; 20]),
            signature: hex(&[0u8; 64]),
        });
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_registration_epoch_bound() {
        let mut genesis = state();
        genesis.registrations.push(GenesisRegistration {
            epoch: 2,
            account: Account::new([1; 20]),
            signature: hex(&[0u8; 64]),
        });
        genesis.validate().unwrap();

        genesis.registrations[0].epoch = 3;
        assert!(matches!(genesis.validate(), Err(Error::InvalidGenesis(_))));
    }

    #[test]
    fn test_invalid_params() {
        let mut genesis = state();
        genesis.params.epoch_blocks = 0;
        assert!(genesis.validate().is_err());
    }
}
