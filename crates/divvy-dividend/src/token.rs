//! Dividend-paying share token.
//!
//! [`DividendToken`] composes a [`ShareLedger`] with the dividend book and
//! exposes the public surface: transfers that fund the pool, claims,
//! withdrawals, burns and all entitlement queries.
//!
//! Every mutating call follows the same three steps:
//! 1. stage all dividend changes in a [`BookTxn`] and check ledger
//!    preconditions (any error here leaves everything untouched),
//! 2. perform the ledger mutation (itself all-or-nothing),
//! 3. commit the staged changes and record events (cannot fail).

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use divvy_core::crypto::PublicKey;
use divvy_core::error::{DividendError, DivvyError};
use divvy_core::ledger::MemoryLedger;
use divvy_core::traits::ShareLedger;
use divvy_core::types::AccountId;
use divvy_core::wide::U256;

use crate::accounting::DividendBook;
use crate::claim::stage_claim;
use crate::config::TokenConfig;
use crate::correction::BalanceDelta;
use crate::events::DividendEvent;
use crate::schedule::{Distribution, era_at, plan_distribution};
use crate::withdrawal::stage_withdrawal;

/// A token shared between threads. Holding the lock for a whole call gives
/// every operation a single global order.
pub type SharedToken<L = MemoryLedger> = Arc<Mutex<DividendToken<L>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendToken<L = MemoryLedger> {
    config: TokenConfig,
    ledger: L,
    book: DividendBook,
    #[serde(skip)]
    events: Vec<DividendEvent>,
}

impl DividendToken<MemoryLedger> {
    /// A token over a fresh, empty in-memory ledger.
    pub fn in_memory(config: TokenConfig) -> Self {
        Self::new(config, MemoryLedger::new())
    }
}

impl<L: ShareLedger> DividendToken<L> {
    /// Wrap `ledger`. The ledger must not hold balances yet: existing shares
    /// would have no correction history.
    pub fn new(config: TokenConfig, ledger: L) -> Self {
        info!(
            authorizer = %config.authorizer,
            claim_deadline = config.claim_deadline,
            "dividend token created"
        );
        Self {
            config,
            ledger,
            book: DividendBook::new(),
            events: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedToken<L> {
        Arc::new(Mutex::new(self))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn authorizer(&self) -> &PublicKey {
        &self.config.authorizer
    }

    pub fn claim_deadline(&self) -> u64 {
        self.config.claim_deadline
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn book(&self) -> &DividendBook {
        &self.book
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Scaled per-share accumulator.
    pub fn per_share(&self) -> U256 {
        self.book.per_share()
    }

    /// Decay era at `now`.
    pub fn era(&self, now: u64) -> u64 {
        era_at(self.config.claim_deadline, now)
    }

    pub fn accumulative_dividend_of(&self, account: &AccountId) -> Result<u64, DividendError> {
        self.book
            .accumulative_dividend_of(account, self.ledger.balance_of(account))
    }

    pub fn withdrawable_dividend_of(&self, account: &AccountId) -> Result<u64, DividendError> {
        self.book
            .withdrawable_dividend_of(account, self.ledger.balance_of(account))
    }

    pub fn withdrawn_dividend_of(&self, account: &AccountId) -> u64 {
        self.book.withdrawn_dividend_of(account)
    }

    pub fn claimed(&self, account: &AccountId) -> bool {
        self.book.claimed(account)
    }

    /// What a payment of `amount` at `now` would add to the accumulator.
    pub fn preview_distribution(&self, amount: u64, now: u64) -> Result<Distribution, DividendError> {
        plan_distribution(
            self.config.claim_deadline,
            amount,
            now,
            self.ledger.total_supply(),
        )
    }

    /// Events recorded since the last [`take_events`](Self::take_events).
    pub fn events(&self) -> &[DividendEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DividendEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Move `amount` shares and pay the same amount into the dividend pool.
    ///
    /// Both corrections are taken at the accumulator value before the
    /// payment, so neither side's existing entitlement moves; the payment is
    /// then shared by all holders at the post-transfer balances.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<Distribution, DivvyError> {
        self.ledger.check_debit(from, amount)?;

        let mut txn = self.book.begin();
        txn.apply_balance_change(from, BalanceDelta::Decrease(amount))?;
        txn.apply_balance_change(to, BalanceDelta::Increase(amount))?;
        let distribution = plan_distribution(
            self.config.claim_deadline,
            amount,
            now,
            self.ledger.total_supply(),
        )?;
        txn.add_per_share(distribution.increment)?;
        let changes = txn.finish();

        self.ledger.transfer(from, to, amount)?;
        self.book.apply(changes);

        self.events.push(DividendEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        if !distribution.is_empty() {
            debug!(
                %from,
                amount,
                era = distribution.era,
                contribution = distribution.contribution,
                "dividends distributed"
            );
            self.events.push(DividendEvent::DividendsDistributed {
                from: *from,
                amount,
                era: distribution.era,
                contribution: distribution.contribution,
            });
        }
        Ok(distribution)
    }

    /// Redeem the authorizer's claim signature for `account`.
    ///
    /// Returns the granted amount.
    pub fn claim(
        &mut self,
        account: &AccountId,
        signature: &[u8; 64],
        now: u64,
    ) -> Result<u64, DivvyError> {
        let mut txn = self.book.begin();
        let amount = stage_claim(&mut txn, &self.config, account, signature, now)?;
        self.ledger.check_mint(account, amount)?;
        let changes = txn.finish();

        self.ledger.mint(account, amount)?;
        self.book.apply(changes);

        info!(%account, amount, "claim granted");
        self.events.push(DividendEvent::Claimed {
            account: *account,
            amount,
        });
        Ok(amount)
    }

    /// Realize all withdrawable dividends of `account` as new shares.
    ///
    /// Returns the amount minted; `0` is a silent no-op.
    pub fn withdraw_dividend(&mut self, account: &AccountId) -> Result<u64, DivvyError> {
        let balance = self.ledger.balance_of(account);
        let mut txn = self.book.begin();
        let amount = stage_withdrawal(&mut txn, account, balance)?;
        if amount == 0 {
            return Ok(0);
        }
        self.ledger.check_mint(account, amount)?;
        let changes = txn.finish();

        self.ledger.mint(account, amount)?;
        self.book.apply(changes);

        info!(%account, amount, "dividend withdrawn");
        self.events.push(DividendEvent::DividendWithdrawn {
            to: *account,
            amount,
        });
        Ok(amount)
    }

    /// Destroy `amount` shares of `from`. Accrued entitlement is kept.
    pub fn burn(&mut self, from: &AccountId, amount: u64) -> Result<(), DivvyError> {
        self.ledger.check_debit(from, amount)?;
        let mut txn = self.book.begin();
        txn.apply_balance_change(from, BalanceDelta::Decrease(amount))?;
        let changes = txn.finish();

        self.ledger.burn(from, amount)?;
        self.book.apply(changes);

        debug!(%from, amount, "shares burned");
        self.events.push(DividendEvent::Burned {
            from: *from,
            amount,
        });
        Ok(())
    }
}
