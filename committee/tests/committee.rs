//! End-to-end committee formation through the public [Keeper] interface.

use commonware_codec::Encode;
use dasigners_committee::{
    genesis::GenesisState,
    msg::{RegisterNextEpoch, RegisterSigner},
    stake::Ledger,
    types::{Account, Params, Quorum},
    Config, Error, Keeper,
};
use dasigners_cryptography::{bn254::PrivateKey, keccak256, PrivateKeyExt};
use dasigners_storage::Memory;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeSet;

const CHAIN_ID: u64 = 16_600;

struct Member {
    account: Account,
    key: PrivateKey,
}

impl Member {
    fn new(i: u8, rng: &mut StdRng) -> Self {
        Self {
            account: Account::new([i; 20]),
            key: PrivateKey::from_rng(rng),
        }
    }

    fn register_msg(&self, socket: &str) -> RegisterSigner {
        RegisterSigner {
            account: self.account.as_ref().to_vec(),
            socket: socket.to_string(),
            pubkey_g1: self.key.public_g1().encode().to_vec(),
            pubkey_g2: self.key.public_g2().encode().to_vec(),
            signature: self
                .key
                .sign_registration(self.account.as_bytes(), CHAIN_ID)
                .encode()
                .to_vec(),
        }
    }

    fn next_epoch_msg(&self, epoch: u64) -> RegisterNextEpoch {
        RegisterNextEpoch {
            account: self.account.as_ref().to_vec(),
            signature: self
                .key
                .sign_epoch_registration(self.account.as_bytes(), epoch, CHAIN_ID)
                .encode()
                .to_vec(),
        }
    }
}

fn members(n: u8, seed: u64) -> Vec<Member> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=n).map(|i| Member::new(i, &mut rng)).collect()
}

fn keeper(params: Params) -> Keeper<Memory, Ledger> {
    let mut keeper = Keeper::new(Config { chain_id: CHAIN_ID }, Memory::new(), Ledger::new(1));
    let genesis = GenesisState {
        params,
        ..GenesisState::default()
    };
    keeper.init_genesis(&genesis).unwrap();
    keeper
}

/// Bonds `weight` whole tokens to `member` through a dedicated validator.
fn bond(keeper: &mut Keeper<Memory, Ledger>, member: &Member, weight: u128) {
    let mut validator = *member.account.as_bytes();
    validator[0] ^= 0xff;
    let validator = Account::new(validator);
    let ledger = keeper.oracle_mut();
    ledger.set_validator(validator, weight, weight);
    ledger.undelegate_all(&member.account);
    ledger.delegate(member.account, validator, weight);
}

/// Registers `member` and enrolls it for the next epoch.
fn enroll(keeper: &mut Keeper<Memory, Ledger>, member: &Member, weight: u128) {
    bond(keeper, member, weight);
    if !keeper.is_signer(&member.account).unwrap() {
        keeper
            .register_signer(&member.register_msg("127.0.0.1:9000"))
            .unwrap();
    }
    let next = keeper.epoch_number().unwrap() + 1;
    keeper
        .register_next_epoch(&member.next_epoch_msg(next))
        .unwrap();
}

fn stored_quorums(keeper: &Keeper<Memory, Ledger>, epoch: u64) -> Vec<Quorum> {
    (0..keeper.quorum_count(epoch).unwrap())
        .map(|id| keeper.quorum(epoch, id).unwrap())
        .collect()
}

fn params(encoded_slices: u64) -> Params {
    Params {
        tokens_per_vote: 10,
        max_votes_per_signer: 16,
        max_quorums: 10,
        encoded_slices,
        epoch_blocks: 5,
    }
}

#[test]
fn test_bit_flip_rejected() {
    let member = &members(1, 0)[0];
    let valid = member.register_msg("a");
    let fields: [(&str, fn(&mut RegisterSigner) -> &mut Vec<u8>); 3] = [
        ("signature", |msg| &mut msg.signature),
        ("pubkey_g1", |msg| &mut msg.pubkey_g1),
        ("pubkey_g2", |msg| &mut msg.pubkey_g2),
    ];
    for (name, field) in fields {
        let bits = field(&mut valid.clone()).len() * 8;
        for bit in (0..bits).step_by(61) {
            let mut keeper = keeper(params(4));
            bond(&mut keeper, member, 100);
            let mut msg = valid.clone();
            field(&mut msg)[bit / 8] ^= 1 << (bit % 8);
            assert!(
                matches!(keeper.register_signer(&msg), Err(Error::InvalidSignature)),
                "{name} bit {bit} accepted"
            );
            assert!(!keeper.is_signer(&member.account).unwrap());
        }
    }
}

#[test]
fn test_socket_round_trip() {
    let member = &members(1, 1)[0];
    let mut keeper = keeper(params(4));
    bond(&mut keeper, member, 100);
    keeper
        .register_signer(&member.register_msg("1.2.3.4:9000"))
        .unwrap();
    let signer = keeper.get_signer(&member.account).unwrap().unwrap();
    assert_eq!(signer.socket, "1.2.3.4:9000");
    assert_eq!(signer.pubkey_g1, member.key.public_g1());
    assert_eq!(signer.pubkey_g2, member.key.public_g2());
}

#[test]
fn test_deterministic_quorums() {
    let members = members(12, 2);
    let mut keepers = [keeper(params(8)), keeper(params(8))];
    for keeper in keepers.iter_mut() {
        for (i, member) in members.iter().enumerate() {
            enroll(keeper, member, 10 * (i as u128 + 1));
        }
        keeper.begin_block(5).unwrap();
    }
    let [first, second] = &keepers;
    let first = stored_quorums(first, 1);
    let second = stored_quorums(second, 1);
    assert!(!first.is_empty());
    assert_eq!(first, second);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.encode(), b.encode());
    }
}

#[test]
fn test_fixed_width_across_epochs() {
    let members = members(10, 3);
    let mut keeper = keeper(params(7));
    for epoch in 1..=6u64 {
        // A different number of signers enrolls every epoch
        for member in members.iter().take(epoch as usize + 1) {
            enroll(&mut keeper, member, 10 * epoch as u128);
        }
        keeper.begin_block(epoch * 5).unwrap();
        let quorums = stored_quorums(&keeper, epoch);
        assert!(!quorums.is_empty());
        assert!(quorums.len() <= 10);
        for quorum in quorums {
            assert_eq!(quorum.len(), 7);
        }
    }
}

#[test]
fn test_aggregation_completeness() {
    let members = members(5, 4);
    let mut keeper = keeper(params(12));
    for member in &members {
        enroll(&mut keeper, member, 30);
    }
    keeper.begin_block(5).unwrap();

    for id in 0..keeper.quorum_count(1).unwrap() {
        let quorum = keeper.quorum(1, id).unwrap();
        let distinct: BTreeSet<_> = quorum.signers.iter().copied().collect();
        let result = keeper.aggregate_pubkey_g1(1, id, &[0xff, 0xff]).unwrap();
        assert_eq!(result.total, distinct.len() as u64);
        assert_eq!(result.hit, result.total);

        let keys: Vec<_> = members
            .iter()
            .filter(|m| distinct.contains(&m.account))
            .map(|m| m.key.public_g1())
            .collect();
        assert_eq!(
            result.aggregate,
            dasigners_cryptography::bn254::ops::aggregate_public_keys(&keys)
        );
    }
}

#[test]
fn test_monotonic_epoch() {
    let members = members(3, 5);
    let mut keeper = keeper(params(4));
    let mut last = keeper.epoch_number().unwrap();
    for height in 0..60 {
        if height % 5 == 0 {
            for member in &members {
                enroll(&mut keeper, member, 20);
            }
        }
        keeper.begin_block(height).unwrap();
        let epoch = keeper.epoch_number().unwrap();
        assert!(epoch == last || epoch == last + 1);
        last = epoch;
    }
    assert_eq!(last, 11);

    // Skipping an epoch halts processing
    let err = keeper.begin_block(70).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(keeper.epoch_number().unwrap(), 11);
}

#[test]
fn test_vote_weighting() {
    let member = &members(1, 6)[0];
    let mut keeper = keeper(Params {
        tokens_per_vote: 10_000,
        max_votes_per_signer: 1024,
        ..params(4)
    });
    enroll(&mut keeper, member, 25_000);

    let params = keeper.params().unwrap();
    let ballots = keeper.ballots(1, &params).unwrap();
    assert_eq!(ballots.len(), 2);

    let signature = keeper
        .registration(1, &member.account)
        .unwrap()
        .unwrap()
        .encode()
        .to_vec();
    let second = keccak256(&signature).to_vec();
    let contents: BTreeSet<_> = ballots.iter().map(|b| b.content.clone()).collect();
    assert_eq!(contents, BTreeSet::from([signature, second]));
}

#[test]
fn test_exact_partition() {
    let members = members(4, 7);
    let mut keeper = keeper(Params {
        tokens_per_vote: 10,
        max_votes_per_signer: 1024,
        ..params(4)
    });
    for member in &members {
        enroll(&mut keeper, member, 20);
    }
    let params = keeper.params().unwrap();
    let ballots = keeper.ballots(1, &params).unwrap();
    assert_eq!(ballots.len(), 8);

    keeper.begin_block(5).unwrap();
    let quorums = stored_quorums(&keeper, 1);
    assert_eq!(quorums.len(), 2);
    let seats: Vec<_> = quorums.iter().flat_map(|q| q.signers.clone()).collect();
    let ranked: Vec<_> = ballots.iter().map(|b| b.account).collect();
    assert_eq!(seats, ranked);
}

#[test]
fn test_genesis_json_round_trip() {
    let members = members(4, 8);
    let mut keeper = keeper(params(4));
    for member in &members {
        enroll(&mut keeper, member, 20);
    }
    keeper.begin_block(5).unwrap();

    let json = keeper.export_genesis().unwrap().to_json().unwrap();
    let genesis = GenesisState::from_json(&json).unwrap();
    let mut restored = Keeper::new(Config { chain_id: CHAIN_ID }, Memory::new(), Ledger::new(1));
    restored.init_genesis(&genesis).unwrap();

    assert_eq!(restored.epoch_number().unwrap(), 1);
    assert_eq!(stored_quorums(&restored, 1), stored_quorums(&keeper, 1));
    assert_eq!(restored.signers().unwrap(), keeper.signers().unwrap());
    let bitmap = vec![0x0f];
    assert_eq!(
        restored.aggregate_pubkey_g1(1, 0, &bitmap).unwrap(),
        keeper.aggregate_pubkey_g1(1, 0, &bitmap).unwrap()
    );
}
