//! Stake-weighted ballots derived from epoch registration signatures.
//!
//! Each registered signer receives `min(weight / tokens_per_vote, max_votes_per_signer)` ballots.
//! The first ballot's content is the signer's registration signature and every following
//! ballot's content is the Keccak-256 hash of the previous one. Ranking all ballots by content
//! yields a seat order that no party can predict before signatures are revealed and that any
//! party can recompute afterwards.

use crate::types::Account;
use dasigners_cryptography::keccak256;

/// A single committee seat candidate.
///
/// Ballots order by `content` first and `account` second.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ballot {
    pub content: Vec<u8>,
    pub account: Account,
}

/// A registered signer entering sortition.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub account: Account,
    /// Encoded registration signature.
    pub signature: Vec<u8>,
    /// Bonded weight in whole tokens.
    pub weight: u128,
}

/// Returns the number of ballots granted to `weight`.
pub fn votes(weight: u128, tokens_per_vote: u64, max_votes_per_signer: u64) -> u64 {
    if tokens_per_vote == 0 {
        return 0;
    }
    let votes = weight / tokens_per_vote as u128;
    votes.min(max_votes_per_signer as u128) as u64
}

/// Generates the ballots of every candidate, ranked by content.
pub fn generate_ballots<I>(
    candidates: I,
    tokens_per_vote: u64,
    max_votes_per_signer: u64,
) -> Vec<Ballot>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut ballots = Vec::new();
    for candidate in candidates {
        let votes = votes(candidate.weight, tokens_per_vote, max_votes_per_signer);
        let mut content = candidate.signature;
        for i in 0..votes {
            let next = (i + 1 < votes).then(|| keccak256(&content).to_vec());
            ballots.push(Ballot {
                content,
                account: candidate.account,
            });
            match next {
                Some(next) => content = next,
                None => break,
            }
        }
    }
    ballots.sort_unstable();
    ballots
}
