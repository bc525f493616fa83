//! Shared test helpers for E2E and adversarial tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use divvy_core::crypto::{KeyPair, sign_claim};
use divvy_core::error::LedgerError;
use divvy_core::ledger::MemoryLedger;
use divvy_core::traits::ShareLedger;
use divvy_core::types::AccountId;
use divvy_dividend::{DividendToken, TokenConfig};

/// Claim deadline used by most tests.
pub const DEADLINE: u64 = 1_700_000_000;

/// The fixed authorizer key.
pub fn authorizer() -> KeyPair {
    KeyPair::from_secret_bytes([0xA7; 32])
}

/// Account identifier from a seed byte.
pub fn acct(seed: u8) -> AccountId {
    AccountId([seed; 32])
}

pub fn token_config(deadline: u64) -> TokenConfig {
    TokenConfig::new(authorizer().public_key(), deadline)
}

/// Empty in-memory token with the default deadline.
pub fn new_token() -> DividendToken {
    DividendToken::in_memory(token_config(DEADLINE))
}

/// Token where every account in `seeds` has already claimed.
pub fn token_with_claims(seeds: &[u8]) -> DividendToken {
    let mut token = new_token();
    for &seed in seeds {
        claim(&mut token, acct(seed), 0);
    }
    token
}

/// Claim for `account` with a valid authorizer signature. Panics on failure.
pub fn claim<L: ShareLedger>(token: &mut DividendToken<L>, account: AccountId, now: u64) -> u64 {
    let sig = sign_claim(&authorizer(), &account);
    token.claim(&account, &sig, now).unwrap()
}

/// Ledger that can be told to reject its mutations through a shared switch.
///
/// The `check_*` preflights still pass, so a failure surfaces only once the
/// mutation itself runs.
#[derive(Debug, Default)]
pub struct FailingLedger {
    inner: MemoryLedger,
    fail: Arc<AtomicBool>,
}

impl FailingLedger {
    /// A ledger plus the switch that makes it fail.
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let ledger = Self::default();
        let switch = ledger.fail.clone();
        (ledger, switch)
    }

    fn failing(&self) -> bool {
        self.fail.load(Ordering::SeqCst)
    }
}

impl ShareLedger for FailingLedger {
    fn balance_of(&self, account: &AccountId) -> u64 {
        self.inner.balance_of(account)
    }

    fn total_supply(&self) -> u64 {
        self.inner.total_supply()
    }

    fn mint(&mut self, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        if self.failing() {
            return Err(LedgerError::SupplyOverflow);
        }
        self.inner.mint(to, amount)
    }

    fn burn(&mut self, from: &AccountId, amount: u64) -> Result<(), LedgerError> {
        if self.failing() {
            return Err(LedgerError::InsufficientBalance { have: 0, need: amount });
        }
        self.inner.burn(from, amount)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if self.failing() {
            return Err(LedgerError::BalanceOverflow(to.to_string()));
        }
        self.inner.transfer(from, to, amount)
    }
}
