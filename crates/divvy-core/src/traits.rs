//! Trait interfaces for Divvy.
//!
//! - [`ShareLedger`]: the base ownership ledger the dividend engine sits on
//!   top of (`MemoryLedger` in [`crate::ledger`] implements it).

use crate::error::LedgerError;
use crate::types::AccountId;

/// Balance bookkeeping for ownership shares.
///
/// The dividend engine reads balances and supply through this trait and asks
/// it to mint, burn and transfer. Every mutating method must be
/// all-or-nothing: on `Err` the ledger is unchanged.
///
/// The `check_*` methods let callers validate a mutation before committing
/// anything else. Default implementations derive them from the read methods.
pub trait ShareLedger: Send + Sync {
    /// Current balance of `account`; unknown accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> u64;

    /// Sum of all balances.
    fn total_supply(&self) -> u64;

    /// Create `amount` new shares owned by `to`.
    fn mint(&mut self, to: &AccountId, amount: u64) -> Result<(), LedgerError>;

    /// Destroy `amount` shares owned by `from`.
    fn burn(&mut self, from: &AccountId, amount: u64) -> Result<(), LedgerError>;

    /// Move `amount` shares from `from` to `to`. `from == to` is allowed.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u64)
        -> Result<(), LedgerError>;

    /// Whether [`mint`](Self::mint) would succeed.
    fn check_mint(&self, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.total_supply()
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        self.balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(to.to_string()))?;
        Ok(())
    }

    /// Whether `from` holds at least `amount` (for burn and transfer).
    fn check_debit(&self, from: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        Ok(())
    }
}
