//! Splits ranked ballots into fixed-width quorums.

use crate::{sortition::Ballot, types::Quorum};

/// Partitions ranked `ballots` into quorums of exactly `width` seats.
///
/// - Full windows of `width` ballots each become a quorum until the ballots run out or
///   `max_quorums` quorums exist.
/// - If ballots remain after the last full window and the cap is not reached, one more quorum
///   is built from the last `width` ballots (overlapping the previous window).
/// - If there are fewer than `width` ballots, a single quorum is filled by cycling through them.
/// - Without ballots, no quorum is formed.
pub fn partition(ballots: &[Ballot], width: usize, max_quorums: usize) -> Vec<Quorum> {
    if ballots.is_empty() || width == 0 || max_quorums == 0 {
        return Vec::new();
    }

    let seats = |window: &[Ballot]| Quorum {
        signers: window.iter().map(|ballot| ballot.account).collect(),
    };
    if ballots.len() < width {
        let quorum = Quorum {
            signers: ballots
                .iter()
                .cycle()
                .take(width)
                .map(|ballot| ballot.account)
                .collect(),
        };
        return vec![quorum];
    }

    let mut quorums: Vec<Quorum> = ballots
        .chunks_exact(width)
        .take(max_quorums)
        .map(seats)
        .collect();
    if ballots.len() % width != 0 && quorums.len() < max_quorums {
        quorums.push(seats(&ballots[ballots.len() - width..]));
    }
    quorums
}
