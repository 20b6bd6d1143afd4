//! Contract-call surface.
//!
//! Mirrors the [Keeper] queries and commands behind a fixed contract address for callers that
//! speak the Solidity ABI. Every method has a flat gas cost, charged before execution, so a
//! call costs the same regardless of quorum width.
//!
//! Points are exchanged as words of their canonical encoding: a G1 point is
//! `(uint256 x, uint256 y)` and a G2 point is `(uint256[2] x, uint256[2] y)`.

use crate::{
    keeper::Keeper,
    msg::{RegisterNextEpoch, RegisterSigner, UpdateSocket},
    stake::StakeOracle,
    types::{Account, Signer},
};
use alloy_primitives::{address, Address, Log, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use commonware_codec::Encode;
use dasigners_cryptography::bn254::group::{G1, G2};
use dasigners_storage::StoreMut;
use thiserror::Error;
use tracing::debug;
use IDASigners::{
    epochNumberCall, getAggPkG1Call, getQuorumCall, getQuorumRowCall, getSignerCall,
    isSignerCall, paramsCall, quorumCountCall, registerNextEpochCall, registerSignerCall,
    registeredEpochCall, updateSocketCall, G1Point, G2Point, NewSigner, SignerDetail,
    SocketUpdated,
};

sol! {
    #![sol(all_derives)]
    #[allow(missing_docs)]
    #[sol(all_derives)]
    interface IDASigners {
        struct G1Point {
            uint256 x;
            uint256 y;
        }

        struct G2Point {
            uint256[2] x;
            uint256[2] y;
        }

        struct SignerDetail {
            address signer;
            string socket;
            G1Point pkG1;
            G2Point pkG2;
        }

        struct Params {
            uint256 tokensPerVote;
            uint256 maxVotesPerSigner;
            uint256 maxQuorums;
            uint256 epochBlocks;
            uint256 encodedSlices;
        }

        event NewSigner(address indexed signer, G1Point pkG1, G2Point pkG2);
        event SocketUpdated(address indexed signer, string socket);

        function epochNumber() external view returns (uint256);
        function quorumCount(uint256 epoch) external view returns (uint256);
        function getSigner(address[] memory accounts) external view returns (SignerDetail[] memory);
        function isSigner(address account) external view returns (bool);
        function registeredEpoch(address account, uint256 epoch) external view returns (bool);
        function getQuorum(uint256 epoch, uint256 quorumId) external view returns (address[] memory);
        function getQuorumRow(uint256 epoch, uint256 quorumId, uint32 row) external view returns (address);
        function getAggPkG1(uint256 epoch, uint256 quorumId, bytes memory bitmap)
            external view returns (G1Point memory aggPkG1, uint256 total, uint256 hit);
        function params() external view returns (Params memory);
        function registerSigner(SignerDetail memory signer, G1Point memory signature) external;
        function registerNextEpoch(G1Point memory signature) external;
        function updateSocket(string memory socket) external;
    }
}

/// Address of the contract.
pub const ADDRESS: Address = address!("0x0000000000000000000000000000000000001000");

/// Size (in bytes) of an ABI word.
const WORD: usize = 32;

/// Errors that can occur when executing a contract call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("out of gas: required {required}, supplied {supplied}")]
    OutOfGas { required: u64, supplied: u64 },
    #[error("write protection")]
    WriteProtection,
    #[error("invalid sender: {0}")]
    InvalidSender(Account),
    #[error("unknown selector")]
    UnknownSelector,
    #[error("invalid input: {0}")]
    InvalidInput(#[from] alloy_sol_types::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    Keeper(#[from] crate::Error),
}

/// A method exposed by the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    EpochNumber,
    QuorumCount,
    GetSigner,
    IsSigner,
    RegisteredEpoch,
    GetQuorum,
    GetQuorumRow,
    GetAggPkG1,
    Params,
    RegisterSigner,
    RegisterNextEpoch,
    UpdateSocket,
}

impl Method {
    pub const ALL: [Method; 12] = [
        Method::EpochNumber,
        Method::QuorumCount,
        Method::GetSigner,
        Method::IsSigner,
        Method::RegisteredEpoch,
        Method::GetQuorum,
        Method::GetQuorumRow,
        Method::GetAggPkG1,
        Method::Params,
        Method::RegisterSigner,
        Method::RegisterNextEpoch,
        Method::UpdateSocket,
    ];

    /// Canonical Solidity signature.
    pub fn signature(&self) -> &'static str {
        match self {
            Method::EpochNumber => epochNumberCall::SIGNATURE,
            Method::QuorumCount => quorumCountCall::SIGNATURE,
            Method::GetSigner => getSignerCall::SIGNATURE,
            Method::IsSigner => isSignerCall::SIGNATURE,
            Method::RegisteredEpoch => registeredEpochCall::SIGNATURE,
            Method::GetQuorum => getQuorumCall::SIGNATURE,
            Method::GetQuorumRow => getQuorumRowCall::SIGNATURE,
            Method::GetAggPkG1 => getAggPkG1Call::SIGNATURE,
            Method::Params => paramsCall::SIGNATURE,
            Method::RegisterSigner => registerSignerCall::SIGNATURE,
            Method::RegisterNextEpoch => registerNextEpochCall::SIGNATURE,
            Method::UpdateSocket => updateSocketCall::SIGNATURE,
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            Method::EpochNumber => epochNumberCall::SELECTOR,
            Method::QuorumCount => quorumCountCall::SELECTOR,
            Method::GetSigner => getSignerCall::SELECTOR,
            Method::IsSigner => isSignerCall::SELECTOR,
            Method::RegisteredEpoch => registeredEpochCall::SELECTOR,
            Method::GetQuorum => getQuorumCall::SELECTOR,
            Method::GetQuorumRow => getQuorumRowCall::SELECTOR,
            Method::GetAggPkG1 => getAggPkG1Call::SELECTOR,
            Method::Params => paramsCall::SELECTOR,
            Method::RegisterSigner => registerSignerCall::SELECTOR,
            Method::RegisterNextEpoch => registerNextEpochCall::SELECTOR,
            Method::UpdateSocket => updateSocketCall::SELECTOR,
        }
    }

    pub fn from_selector(selector: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.selector() == selector)
    }

    /// Flat gas cost of a call.
    pub fn gas(&self) -> u64 {
        match self {
            Method::EpochNumber | Method::Params => 1_000,
            Method::QuorumCount | Method::IsSigner | Method::RegisteredEpoch => 2_000,
            Method::GetQuorumRow => 2_500,
            Method::GetSigner => 10_000,
            Method::GetQuorum => 20_000,
            Method::GetAggPkG1 => 50_000,
            Method::UpdateSocket => 20_000,
            Method::RegisterSigner | Method::RegisterNextEpoch => 150_000,
        }
    }

    /// Returns true if the method mutates state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Method::RegisterSigner | Method::RegisterNextEpoch | Method::UpdateSocket
        )
    }
}

/// A call into the contract.
#[derive(Clone, Copy, Debug)]
pub struct Call<'a> {
    /// Origin of the enclosing transaction.
    pub origin: Account,
    /// Selector followed by ABI-encoded arguments.
    pub input: &'a [u8],
    /// Gas supplied to the call.
    pub gas: u64,
    /// Set for static calls, which may not mutate state.
    pub read_only: bool,
}

/// The result of a successful call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub data: Vec<u8>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

/// Executes `call` against `keeper`.
pub fn execute<S: StoreMut, O: StakeOracle>(
    keeper: &mut Keeper<S, O>,
    call: &Call<'_>,
) -> Result<Output, Error> {
    let Some((selector, data)) = call.input.split_first_chunk::<4>() else {
        return Err(Error::UnknownSelector);
    };
    let method = Method::from_selector(selector).ok_or(Error::UnknownSelector)?;
    let required = method.gas();
    if required > call.gas {
        return Err(Error::OutOfGas {
            required,
            supplied: call.gas,
        });
    }
    if call.read_only && method.is_mutating() {
        return Err(Error::WriteProtection);
    }
    debug!(?method, origin = %call.origin, "executing contract call");

    let mut logs = Vec::new();
    let output = match method {
        Method::EpochNumber => {
            epochNumberCall::abi_decode_raw(data, true)?;
            let epoch = U256::from(keeper.epoch_number()?);
            epochNumberCall::abi_encode_returns(&(epoch,))
        }
        Method::QuorumCount => {
            let args = quorumCountCall::abi_decode_raw(data, true)?;
            let count = keeper.quorum_count(uint(args.epoch, "epoch")?)?;
            quorumCountCall::abi_encode_returns(&(U256::from(count),))
        }
        Method::GetSigner => {
            let args = getSignerCall::abi_decode_raw(data, true)?;
            let mut details = Vec::with_capacity(args.accounts.len());
            for address in args.accounts {
                let account = account(address);
                let signer = keeper
                    .get_signer(&account)?
                    .ok_or(crate::Error::SignerNotFound(account))?;
                details.push(signer_detail(&signer));
            }
            getSignerCall::abi_encode_returns(&(details,))
        }
        Method::IsSigner => {
            let args = isSignerCall::abi_decode_raw(data, true)?;
            let found = keeper.is_signer(&account(args.account))?;
            isSignerCall::abi_encode_returns(&(found,))
        }
        Method::RegisteredEpoch => {
            let args = registeredEpochCall::abi_decode_raw(data, true)?;
            let epoch = uint(args.epoch, "epoch")?;
            let found = keeper.registration(epoch, &account(args.account))?.is_some();
            registeredEpochCall::abi_encode_returns(&(found,))
        }
        Method::GetQuorum => {
            let args = getQuorumCall::abi_decode_raw(data, true)?;
            let quorum = keeper.quorum(
                uint(args.epoch, "epoch")?,
                uint(args.quorumId, "quorum id")?,
            )?;
            let seats: Vec<_> = quorum.signers.iter().map(address).collect();
            getQuorumCall::abi_encode_returns(&(seats,))
        }
        Method::GetQuorumRow => {
            let args = getQuorumRowCall::abi_decode_raw(data, true)?;
            let seat = keeper.quorum_row(
                uint(args.epoch, "epoch")?,
                uint(args.quorumId, "quorum id")?,
                args.row,
            )?;
            getQuorumRowCall::abi_encode_returns(&(address(&seat),))
        }
        Method::GetAggPkG1 => {
            let args = getAggPkG1Call::abi_decode_raw(data, true)?;
            let result = keeper.aggregate_pubkey_g1(
                uint(args.epoch, "epoch")?,
                uint(args.quorumId, "quorum id")?,
                &args.bitmap,
            )?;
            getAggPkG1Call::abi_encode_returns(&(
                g1_point(&result.aggregate),
                U256::from(result.total),
                U256::from(result.hit),
            ))
        }
        Method::Params => {
            paramsCall::abi_decode_raw(data, true)?;
            let params = keeper.params()?;
            let params = IDASigners::Params {
                tokensPerVote: U256::from(params.tokens_per_vote),
                maxVotesPerSigner: U256::from(params.max_votes_per_signer),
                maxQuorums: U256::from(params.max_quorums),
                epochBlocks: U256::from(params.epoch_blocks),
                encodedSlices: U256::from(params.encoded_slices),
            };
            paramsCall::abi_encode_returns(&(params,))
        }
        Method::RegisterSigner => {
            let args = registerSignerCall::abi_decode_raw(data, true)?;
            let detail = args.signer;
            let account = account(detail.signer);
            if account != call.origin {
                return Err(Error::InvalidSender(call.origin));
            }
            let msg = RegisterSigner {
                account: account.as_ref().to_vec(),
                socket: detail.socket.clone(),
                pubkey_g1: g1_bytes(&detail.pkG1),
                pubkey_g2: g2_bytes(&detail.pkG2),
                signature: g1_bytes(&args.signature),
            };
            keeper.register_signer(&msg)?;
            logs.push(log(&NewSigner {
                signer: detail.signer,
                pkG1: detail.pkG1,
                pkG2: detail.pkG2,
            }));
            logs.push(log(&SocketUpdated {
                signer: detail.signer,
                socket: detail.socket,
            }));
            registerSignerCall::abi_encode_returns(&())
        }
        Method::RegisterNextEpoch => {
            let args = registerNextEpochCall::abi_decode_raw(data, true)?;
            let msg = RegisterNextEpoch {
                account: call.origin.as_ref().to_vec(),
                signature: g1_bytes(&args.signature),
            };
            keeper.register_next_epoch(&msg)?;
            registerNextEpochCall::abi_encode_returns(&())
        }
        Method::UpdateSocket => {
            let args = updateSocketCall::abi_decode_raw(data, true)?;
            let msg = UpdateSocket {
                account: call.origin.as_ref().to_vec(),
                socket: args.socket.clone(),
            };
            keeper.update_socket(&msg)?;
            logs.push(log(&SocketUpdated {
                signer: address(&call.origin),
                socket: args.socket,
            }));
            updateSocketCall::abi_encode_returns(&())
        }
    };

    Ok(Output {
        data: output,
        gas_used: required,
        logs,
    })
}

fn address(account: &Account) -> Address {
    Address::from(*account.as_bytes())
}

fn account(address: Address) -> Account {
    Account::new(address.0.0)
}

fn uint(value: U256, name: &'static str) -> Result<u64, Error> {
    u64::try_from(value).map_err(|_| Error::InvalidArgument(name))
}

fn word(bytes: &[u8], index: usize) -> U256 {
    U256::from_be_slice(&bytes[index * WORD..(index + 1) * WORD])
}

fn g1_point(point: &G1) -> G1Point {
    let bytes = point.encode();
    G1Point {
        x: word(&bytes, 0),
        y: word(&bytes, 1),
    }
}

fn g2_point(point: &G2) -> G2Point {
    let bytes = point.encode();
    G2Point {
        x: [word(&bytes, 0), word(&bytes, 1)],
        y: [word(&bytes, 2), word(&bytes, 3)],
    }
}

fn g1_bytes(point: &G1Point) -> Vec<u8> {
    [point.x, point.y]
        .iter()
        .flat_map(U256::to_be_bytes::<WORD>)
        .collect()
}

fn g2_bytes(point: &G2Point) -> Vec<u8> {
    point
        .x
        .iter()
        .chain(point.y.iter())
        .flat_map(U256::to_be_bytes::<WORD>)
        .collect()
}

fn signer_detail(signer: &Signer) -> SignerDetail {
    SignerDetail {
        signer: address(&signer.account),
        socket: signer.socket.clone(),
        pkG1: g1_point(&signer.pubkey_g1),
        pkG2: g2_point(&signer.pubkey_g2),
    }
}

fn log(event: &impl SolEvent) -> Log {
    Log {
        address: ADDRESS,
        data: event.encode_log_data(),
    }
}
