//! Notifications emitted by token operations.

use serde::{Deserialize, Serialize};

use divvy_core::types::AccountId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DividendEvent {
    Transfer { from: AccountId, to: AccountId, amount: u64 },
    /// A payment moved the per-share accumulator. `contribution` is what
    /// survived era decay out of `amount`.
    DividendsDistributed { from: AccountId, amount: u64, era: u64, contribution: u64 },
    /// Only emitted for non-zero amounts.
    DividendWithdrawn { to: AccountId, amount: u64 },
    Claimed { account: AccountId, amount: u64 },
    Burned { from: AccountId, amount: u64 },
}
