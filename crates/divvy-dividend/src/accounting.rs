//! Dividend accounting engine.
//!
//! [`DividendBook`] owns the global per-share accumulator and one
//! [`DividendAccount`] per identity. It never reads balances itself; callers
//! pass the ledger balance into every entitlement query.
//!
//! Mutation happens only through a [`BookTxn`]: a staged overlay that reads
//! through to the book, records every change locally and finally yields a
//! [`BookChanges`] set. Applying that set cannot fail, so an operation either
//! errors out while staging (and the book is untouched) or commits in full.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use divvy_core::constants::MAGNITUDE;
use divvy_core::error::DividendError;
use divvy_core::types::AccountId;
use divvy_core::wide::{SignedWide, U256, narrow};

use crate::correction::{BalanceDelta, apply_correction, scaled};

/// Dividend-side record of one identity. Created lazily; the default value
/// is what an untouched account looks like.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendAccount {
    /// Scaled correction term, owned by the correction ledger.
    pub correction: SignedWide,
    /// Total dividends realized so far; never decreases.
    pub withdrawn: u64,
    /// One-way claim flag.
    pub claimed: bool,
}

/// Total entitlement: `(per_share * balance + correction) / MAGNITUDE`.
///
/// The numerator is formed with signed 256-bit arithmetic and only then
/// divided, flooring the non-negative result.
pub fn accumulative_dividend(
    account: &AccountId,
    per_share: U256,
    balance: u64,
    record: &DividendAccount,
) -> Result<u64, DividendError> {
    let numerator = SignedWide::positive(scaled(per_share, balance)?)
        .checked_add(record.correction)
        .ok_or(DividendError::ArithmeticOverflow)?;
    let numerator = numerator
        .to_unsigned()
        .ok_or_else(|| DividendError::NegativeEntitlement(account.to_string()))?;
    narrow(numerator / MAGNITUDE).ok_or(DividendError::ArithmeticOverflow)
}

/// Entitlement not yet withdrawn.
pub fn withdrawable_dividend(
    account: &AccountId,
    per_share: U256,
    balance: u64,
    record: &DividendAccount,
) -> Result<u64, DividendError> {
    accumulative_dividend(account, per_share, balance, record)?
        .checked_sub(record.withdrawn)
        .ok_or_else(|| DividendError::NegativeEntitlement(account.to_string()))
}

/// Global accumulator plus per-account dividend records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendBook {
    per_share: U256,
    accounts: HashMap<AccountId, DividendAccount>,
}

impl DividendBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scaled dividends accrued per share since creation.
    pub fn per_share(&self) -> U256 {
        self.per_share
    }

    /// The record for `account`, or the default for an unseen one.
    pub fn account(&self, account: &AccountId) -> DividendAccount {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    /// Number of identities with a stored record.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn accumulative_dividend_of(
        &self,
        account: &AccountId,
        balance: u64,
    ) -> Result<u64, DividendError> {
        accumulative_dividend(account, self.per_share, balance, &self.account(account))
    }

    pub fn withdrawable_dividend_of(
        &self,
        account: &AccountId,
        balance: u64,
    ) -> Result<u64, DividendError> {
        withdrawable_dividend(account, self.per_share, balance, &self.account(account))
    }

    pub fn withdrawn_dividend_of(&self, account: &AccountId) -> u64 {
        self.accounts.get(account).map_or(0, |r| r.withdrawn)
    }

    pub fn claimed(&self, account: &AccountId) -> bool {
        self.accounts.get(account).is_some_and(|r| r.claimed)
    }

    /// Open a staged transaction over this book.
    pub fn begin(&self) -> BookTxn<'_> {
        BookTxn {
            book: self,
            per_share: self.per_share,
            staged: HashMap::new(),
        }
    }

    /// Commit a change set produced by [`BookTxn::finish`].
    pub fn apply(&mut self, changes: BookChanges) {
        self.per_share = changes.per_share;
        for (account, record) in changes.accounts {
            if record == DividendAccount::default() {
                self.accounts.remove(&account);
            } else {
                self.accounts.insert(account, record);
            }
        }
    }
}

/// Staged changes against a [`DividendBook`].
///
/// Dropping a transaction without calling [`finish`](Self::finish) discards
/// everything it staged.
#[derive(Debug)]
pub struct BookTxn<'a> {
    book: &'a DividendBook,
    per_share: U256,
    staged: HashMap<AccountId, DividendAccount>,
}

impl BookTxn<'_> {
    pub fn per_share(&self) -> U256 {
        self.per_share
    }

    /// Current (staged or committed) record for `account`.
    pub fn account(&self, account: &AccountId) -> DividendAccount {
        match self.staged.get(account) {
            Some(record) => record.clone(),
            None => self.book.account(account),
        }
    }

    fn record_mut(&mut self, account: &AccountId) -> &mut DividendAccount {
        let book = self.book;
        self.staged
            .entry(*account)
            .or_insert_with(|| book.account(account))
    }

    pub fn withdrawable_dividend_of(
        &self,
        account: &AccountId,
        balance: u64,
    ) -> Result<u64, DividendError> {
        withdrawable_dividend(account, self.per_share, balance, &self.account(account))
    }

    /// Correction-ledger hook: `account`'s balance is changing by `delta`.
    pub fn apply_balance_change(
        &mut self,
        account: &AccountId,
        delta: BalanceDelta,
    ) -> Result<(), DividendError> {
        let per_share = self.per_share;
        let record = self.record_mut(account);
        record.correction = apply_correction(record.correction, per_share, delta)?;
        debug!(%account, ?delta, correction = %record.correction, "correction updated");
        Ok(())
    }

    /// Fold a distribution into the accumulator.
    pub fn add_per_share(&mut self, increment: U256) -> Result<(), DividendError> {
        self.per_share = self
            .per_share
            .checked_add(increment)
            .ok_or(DividendError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_withdrawal(
        &mut self,
        account: &AccountId,
        amount: u64,
    ) -> Result<(), DividendError> {
        let record = self.record_mut(account);
        record.withdrawn = record
            .withdrawn
            .checked_add(amount)
            .ok_or(DividendError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn mark_claimed(&mut self, account: &AccountId) {
        self.record_mut(account).claimed = true;
    }

    /// Close the transaction, yielding the change set to commit.
    pub fn finish(self) -> BookChanges {
        BookChanges {
            per_share: self.per_share,
            accounts: self.staged,
        }
    }
}

/// Change set produced by a [`BookTxn`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "changes do nothing until applied to the book"]
pub struct BookChanges {
    per_share: U256,
    accounts: HashMap<AccountId, DividendAccount>,
}

impl BookChanges {
    /// Number of account records touched.
    pub fn touched(&self) -> usize {
        self.accounts.len()
    }
}
