//! In-memory share ledger.
//!
//! [`MemoryLedger`] keeps balances in a `HashMap` and tracks total supply.
//! It is the ledger the CLI persists to its JSON state file and the one all
//! tests run against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::LedgerError;
use crate::traits::ShareLedger;
use crate::types::AccountId;

/// Balance map plus total supply. Zero balances are pruned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    balances: HashMap<AccountId, u64>,
    total_supply: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts holding a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Iterate over `(account, balance)` pairs with non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &u64)> {
        self.balances.iter()
    }

    fn set_balance(&mut self, account: &AccountId, balance: u64) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
    }
}

impl ShareLedger for MemoryLedger {
    fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u64 {
        self.total_supply
    }

    fn mint(&mut self, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(to.to_string()))?;
        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok(())
    }

    fn burn(&mut self, from: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.check_debit(from, amount)?;
        let balance = self.balance_of(from) - amount;
        // Supply always covers any single balance.
        self.total_supply -= amount;
        self.set_balance(from, balance);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.check_debit(from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(to.to_string()))?;
        let from_balance = self.balance_of(from) - amount;
        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }
}
