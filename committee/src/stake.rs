//! Bonded stake lookups.

use crate::types::Account;
use std::collections::BTreeMap;

/// Maximum number of delegation records read per delegator.
///
/// Delegators with more records are weighted by their first `MAX_DELEGATIONS` records only.
pub const MAX_DELEGATIONS: usize = 10;

/// Number of base units in one whole token.
pub const DEFAULT_CONVERSION_RATE: u128 = 1_000_000_000_000_000_000;

/// Source of bonded stake for signers.
pub trait StakeOracle {
    /// Returns the bonded weight of `account` in whole tokens.
    fn bonded_weight(&self, account: &Account) -> u128;
}

/// A bonded validator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Validator {
    /// Bonded tokens in base units.
    pub tokens: u128,
    /// Total delegator shares issued by the validator.
    pub shares: u128,
}

impl Validator {
    /// Converts `shares` to base-unit tokens, rounding down.
    pub fn tokens_from_shares(&self, shares: u128) -> u128 {
        if self.shares == 0 {
            return 0;
        }
        mul_div(shares, self.tokens, self.shares)
    }
}

/// Computes `floor(a * b / c)` without intermediate overflow in common cases.
///
/// Writing `a = q1 * c + r1` and `b = q2 * c + r2` gives
/// `a * b / c = q1 * b + r1 * q2 + r1 * r2 / c`. The last product saturates only when both
/// remainders exceed `2^64`.
fn mul_div(a: u128, b: u128, c: u128) -> u128 {
    if let Some(product) = a.checked_mul(b) {
        return product / c;
    }
    let (q1, r1) = (a / c, a % c);
    let (q2, r2) = (b / c, b % c);
    q1.saturating_mul(b)
        .saturating_add(r1.saturating_mul(q2))
        .saturating_add(r1.saturating_mul(r2) / c)
}

/// An in-memory staking ledger.
///
/// Delegations are kept in insertion order per delegator so that the capped iteration in
/// [Ledger::bonded_tokens] is deterministic.
#[derive(Clone, Debug)]
pub struct Ledger {
    conversion_rate: u128,
    validators: BTreeMap<Account, Validator>,
    delegations: BTreeMap<Account, Vec<(Account, u128)>>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSION_RATE)
    }
}

impl Ledger {
    /// Create an empty ledger. A `conversion_rate` of zero is treated as one.
    pub fn new(conversion_rate: u128) -> Self {
        Self {
            conversion_rate: conversion_rate.max(1),
            validators: BTreeMap::new(),
            delegations: BTreeMap::new(),
        }
    }

    /// Creates or replaces a validator.
    pub fn set_validator(&mut self, validator: Account, tokens: u128, shares: u128) {
        self.validators
            .insert(validator, Validator { tokens, shares });
    }

    /// Returns a validator, if known.
    pub fn validator(&self, validator: &Account) -> Option<&Validator> {
        self.validators.get(validator)
    }

    /// Adds `shares` of `validator` to `delegator`.
    ///
    /// Existing records are topped up in place; new records are appended.
    pub fn delegate(&mut self, delegator: Account, validator: Account, shares: u128) {
        let records = self.delegations.entry(delegator).or_default();
        match records.iter_mut().find(|(v, _)| *v == validator) {
            Some((_, existing)) => *existing = existing.saturating_add(shares),
            None => records.push((validator, shares)),
        }
    }

    /// Removes every delegation of `delegator`.
    pub fn undelegate_all(&mut self, delegator: &Account) {
        self.delegations.remove(delegator);
    }

    /// Returns the bonded tokens (in base units) of `delegator`, reading at most
    /// [MAX_DELEGATIONS] records.
    pub fn bonded_tokens(&self, delegator: &Account) -> u128 {
        let Some(records) = self.delegations.get(delegator) else {
            return 0;
        };
        records
            .iter()
            .take(MAX_DELEGATIONS)
            .filter_map(|(validator, shares)| {
                self.validators
                    .get(validator)
                    .map(|v| v.tokens_from_shares(*shares))
            })
            .fold(0u128, u128::saturating_add)
    }
}

impl StakeOracle for Ledger {
    fn bonded_weight(&self, account: &Account) -> u128 {
        self.bonded_tokens(account) / self.conversion_rate
    }
}
