//! Withdrawal tracker.
//!
//! Turns unwithdrawn entitlement into new shares: the amount is added to
//! `withdrawn` and the matching balance increase goes through the correction
//! ledger like any other mint. Nothing is special-cased for dividends earned
//! on previously withdrawn dividends.

use divvy_core::error::DividendError;
use divvy_core::types::AccountId;

use crate::accounting::BookTxn;
use crate::correction::BalanceDelta;

/// Stage a withdrawal for `account` holding `balance`.
///
/// Returns the amount to mint; `0` means nothing was staged.
pub fn stage_withdrawal(
    txn: &mut BookTxn<'_>,
    account: &AccountId,
    balance: u64,
) -> Result<u64, DividendError> {
    let amount = txn.withdrawable_dividend_of(account, balance)?;
    if amount == 0 {
        return Ok(0);
    }
    txn.record_withdrawal(account, amount)?;
    txn.apply_balance_change(account, BalanceDelta::Increase(amount))?;
    Ok(amount)
}
