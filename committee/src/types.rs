//! Types shared by the registry, sortition, and query surface.

use crate::Error;
use bytes::{Buf, BufMut, Bytes};
use commonware_codec::{
    varint::UInt, EncodeSize, Error as CodecError, FixedSize, Read, ReadExt, Write,
};
use commonware_utils::{from_hex_formatted, hex};
use dasigners_cryptography::bn254::group::{G1, G2};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Size (in bytes) of an [Account].
pub const ACCOUNT_LENGTH: usize = 20;

/// Maximum length (in bytes) of a signer socket.
pub const MAX_SOCKET_LENGTH: usize = 256;

/// Maximum number of seats in a single quorum.
pub const MAX_QUORUM_WIDTH: usize = 1 << 16;

/// A 20-byte account identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Account([u8; ACCOUNT_LENGTH]);

impl Account {
    /// Wraps raw account bytes.
    pub const fn new(bytes: [u8; ACCOUNT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw account bytes.
    pub const fn as_bytes(&self) -> &[u8; ACCOUNT_LENGTH] {
        &self.0
    }
}

impl From<[u8; ACCOUNT_LENGTH]> for Account {
    fn from(bytes: [u8; ACCOUNT_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Account {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; ACCOUNT_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::InvalidLength("account", bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Account {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex(&self.0))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", hex(&self.0))
    }
}

impl FromStr for Account {
    type Err = Error;

    /// Parses a hex account, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = from_hex_formatted(s).ok_or(Error::InvalidHex("account"))?;
        Self::try_from(bytes.as_slice())
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Write for Account {
    fn write(&self, buf: &mut impl BufMut) {
        self.0.write(buf);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        Ok(Self(<[u8; ACCOUNT_LENGTH]>::read(buf)?))
    }
}

impl FixedSize for Account {
    const SIZE: usize = ACCOUNT_LENGTH;
}

/// A registered data-availability signer.
///
/// Keys are immutable once registered. The socket is the only field that may change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signer {
    pub account: Account,
    pub socket: String,
    pub pubkey_g1: G1,
    pub pubkey_g2: G2,
}

impl Write for Signer {
    fn write(&self, buf: &mut impl BufMut) {
        self.account.write(buf);
        Bytes::copy_from_slice(self.socket.as_bytes()).write(buf);
        self.pubkey_g1.write(buf);
        self.pubkey_g2.write(buf);
    }
}

impl Read for Signer {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let account = Account::read(buf)?;
        let socket = Bytes::read_cfg(buf, &(..=MAX_SOCKET_LENGTH).into())?;
        let socket = String::from_utf8(socket.to_vec())
            .map_err(|_| CodecError::Invalid("Signer", "socket not utf8"))?;
        let pubkey_g1 = G1::read(buf)?;
        let pubkey_g2 = G2::read(buf)?;
        Ok(Self {
            account,
            socket,
            pubkey_g1,
            pubkey_g2,
        })
    }
}

impl EncodeSize for Signer {
    fn encode_size(&self) -> usize {
        Account::SIZE
            + Bytes::copy_from_slice(self.socket.as_bytes()).encode_size()
            + G1::SIZE
            + G2::SIZE
    }
}

/// Chain-wide configuration of the committee engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Bonded tokens (in whole units) required per ballot.
    pub tokens_per_vote: u64,
    /// Maximum number of ballots a single signer may hold.
    pub max_votes_per_signer: u64,
    /// Maximum number of quorums formed per epoch.
    pub max_quorums: u64,
    /// Number of seats in every quorum.
    pub encoded_slices: u64,
    /// Number of blocks in an epoch.
    pub epoch_blocks: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            tokens_per_vote: 10,
            max_votes_per_signer: 1024,
            max_quorums: 10,
            encoded_slices: 3072,
            epoch_blocks: 5760,
        }
    }
}

impl Params {
    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tokens_per_vote == 0 {
            return Err(Error::InvalidParams("tokens_per_vote must be positive"));
        }
        if self.max_votes_per_signer == 0 {
            return Err(Error::InvalidParams("max_votes_per_signer must be positive"));
        }
        if self.max_quorums == 0 {
            return Err(Error::InvalidParams("max_quorums must be positive"));
        }
        if self.encoded_slices == 0 {
            return Err(Error::InvalidParams("encoded_slices must be positive"));
        }
        if self.encoded_slices > MAX_QUORUM_WIDTH as u64 {
            return Err(Error::InvalidParams("encoded_slices too large"));
        }
        if self.epoch_blocks == 0 {
            return Err(Error::InvalidParams("epoch_blocks must be positive"));
        }
        Ok(())
    }

    /// Quorum width as a `usize`.
    pub fn quorum_width(&self) -> usize {
        self.encoded_slices as usize
    }

    /// Length (in bytes) of a bitmap covering one quorum.
    pub fn bitmap_length(&self) -> usize {
        self.quorum_width().div_ceil(8)
    }

    /// Returns the epoch containing `height`.
    pub fn epoch_at(&self, height: u64) -> u64 {
        height / self.epoch_blocks
    }
}

impl Write for Params {
    fn write(&self, buf: &mut impl BufMut) {
        UInt(self.tokens_per_vote).write(buf);
        UInt(self.max_votes_per_signer).write(buf);
        UInt(self.max_quorums).write(buf);
        UInt(self.encoded_slices).write(buf);
        UInt(self.epoch_blocks).write(buf);
    }
}

impl Read for Params {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        Ok(Self {
            tokens_per_vote: UInt::read(buf)?.into(),
            max_votes_per_signer: UInt::read(buf)?.into(),
            max_quorums: UInt::read(buf)?.into(),
            encoded_slices: UInt::read(buf)?.into(),
            epoch_blocks: UInt::read(buf)?.into(),
        })
    }
}

impl EncodeSize for Params {
    fn encode_size(&self) -> usize {
        UInt(self.tokens_per_vote).encode_size()
            + UInt(self.max_votes_per_signer).encode_size()
            + UInt(self.max_quorums).encode_size()
            + UInt(self.encoded_slices).encode_size()
            + UInt(self.epoch_blocks).encode_size()
    }
}

/// An ordered committee of seats. An account may hold more than one seat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quorum {
    pub signers: Vec<Account>,
}

impl Quorum {
    /// Number of seats.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// Returns true if the quorum has no seats.
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl Write for Quorum {
    fn write(&self, buf: &mut impl BufMut) {
        self.signers.write(buf);
    }
}

impl Read for Quorum {
    /// Maximum number of seats.
    type Cfg = usize;

    fn read_cfg(buf: &mut impl Buf, max: &usize) -> Result<Self, CodecError> {
        let signers = Vec::<Account>::read_cfg(buf, &((..=*max).into(), ()))?;
        Ok(Self { signers })
    }
}

impl EncodeSize for Quorum {
    fn encode_size(&self) -> usize {
        self.signers.encode_size()
    }
}

/// A signer's intent to join the committee of an epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub epoch: u64,
    pub account: Account,
    /// Signature over the epoch registration message, also the signer's sortition seed.
    pub signature: G1,
}

/// The result of aggregating a subset of a quorum's public keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregatePubkey {
    /// Sum of the G1 keys of every distinct signer with a set bit.
    pub aggregate: G1,
    /// Number of distinct signers in the quorum.
    pub total: u64,
    /// Number of distinct signers with at least one set bit.
    pub hit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::{Decode, DecodeExt, Encode};
    use dasigners_cryptography::{bn254::PrivateKey, PrivateKeyExt};

    fn signer(socket: &str) -> Signer {
        let key = PrivateKey::from_seed(1);
        Signer {
            account: Account::new([9; ACCOUNT_LENGTH]),
            socket: socket.to_string(),
            pubkey_g1: key.public_g1(),
            pubkey_g2: key.public_g2(),
        }
    }

    #[test]
    fn test_account_hex() {
        let account = Account::new([0xab; ACCOUNT_LENGTH]);
        let s = account.to_string();
        assert_eq!(s, "ab".repeat(ACCOUNT_LENGTH));
        assert_eq!(s.parse::<Account>().unwrap(), account);
        assert_eq!(format!("0x{s}").parse::<Account>().unwrap(), account);
        assert!(matches!(
            "abcd".parse::<Account>(),
            Err(Error::InvalidLength("account", 2))
        ));
        assert!(matches!(
            "zz".parse::<Account>(),
            Err(Error::InvalidHex("account"))
        ));
    }

    #[test]
    fn test_account_serde() {
        let account = Account::new([1; ACCOUNT_LENGTH]);
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(ACCOUNT_LENGTH)));
        assert_eq!(serde_json::from_str::<Account>(&json).unwrap(), account);
    }

    #[test]
    fn test_signer_codec() {
        let signer = signer("1.2.3.4:9000");
        let encoded = signer.encode();
        assert_eq!(encoded.len(), signer.encode_size());
        assert_eq!(Signer::decode(encoded).unwrap(), signer);
    }

    #[test]
    fn test_signer_socket_too_long() {
        let signer = signer(&"x".repeat(MAX_SOCKET_LENGTH + 1));
        assert!(Signer::decode(signer.encode()).is_err());
    }

    #[test]
    fn test_signer_socket_layout() {
        let signer = signer("1.2.3.4:9000");
        let encoded = signer.encode();
        let socket = Bytes::from_static(b"1.2.3.4:9000").encode();
        let start = ACCOUNT_LENGTH;
        assert_eq!(&encoded[start..start + socket.len()], &socket[..]);
    }

    #[test]
    fn test_signer_socket_not_utf8() {
        let mut encoded = signer("ab").encode().to_vec();
        let socket = Bytes::from_static(b"ab").encode();
        let last = ACCOUNT_LENGTH + socket.len() - 1;
        encoded[last] = 0xff;
        assert!(matches!(
            Signer::decode(encoded.as_slice()),
            Err(CodecError::Invalid("Signer", "socket not utf8"))
        ));
    }

    #[test]
    fn test_quorum_codec_layout() {
        let quorum = Quorum {
            signers: vec![Account::new([1; ACCOUNT_LENGTH]), Account::new([2; ACCOUNT_LENGTH])],
        };
        assert_eq!(quorum.encode(), quorum.signers.encode());
        assert_eq!(quorum.encode_size(), quorum.encode().len());
    }

    #[test]
    fn test_quorum_codec_bound() {
        let quorum = Quorum {
            signers: vec![Account::new([1; ACCOUNT_LENGTH]); 4],
        };
        let encoded = quorum.encode();
        assert_eq!(Quorum::decode_cfg(encoded.clone(), &4).unwrap(), quorum);
        assert!(Quorum::decode_cfg(encoded, &3).is_err());
    }

    #[test]
    fn test_params_validate() {
        assert!(Params::default().validate().is_ok());
        let params = Params {
            tokens_per_vote: 0,
            ..Params::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
        let params = Params {
            epoch_blocks: 0,
            ..Params::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_helpers() {
        let params = Params {
            encoded_slices: 9,
            epoch_blocks: 10,
            ..Params::default()
        };
        assert_eq!(params.bitmap_length(), 2);
        assert_eq!(params.epoch_at(0), 0);
        assert_eq!(params.epoch_at(19), 1);
        assert_eq!(params.epoch_at(20), 2);
        assert_eq!(Params::decode(params.encode()).unwrap(), params);
    }
}
