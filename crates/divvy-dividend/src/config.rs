//! Immutable token configuration.

use serde::{Deserialize, Serialize};

use divvy_core::crypto::PublicKey;

/// Parameters fixed when a token is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Key whose signature authorizes claims.
    pub authorizer: PublicKey,
    /// Unix timestamp (seconds). Claims must land strictly before it; decay
    /// eras are counted from it.
    pub claim_deadline: u64,
}

impl TokenConfig {
    pub fn new(authorizer: PublicKey, claim_deadline: u64) -> Self {
        Self {
            authorizer,
            claim_deadline,
        }
    }

    /// Whether a claim submitted at `now` is still inside the window.
    pub fn claim_window_open(&self, now: u64) -> bool {
        now < self.claim_deadline
    }
}
