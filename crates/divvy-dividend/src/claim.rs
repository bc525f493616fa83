//! Claim authorizer.
//!
//! Each identity may claim once (`Unclaimed -> Claimed`), strictly before the
//! claim deadline, presenting the authorizer's signature over its
//! [`claim_message`](divvy_core::crypto::claim_message). Checks run in this
//! order: already claimed, expired, signature.
//!
//! The signed message carries no nonce, so the claimed flag is the only
//! replay protection.

use tracing::warn;

use divvy_core::constants::CLAIM_AMOUNT;
use divvy_core::crypto::verify_claim;
use divvy_core::error::{ClaimError, DivvyError};
use divvy_core::types::AccountId;

use crate::accounting::BookTxn;
use crate::config::TokenConfig;
use crate::correction::BalanceDelta;

/// Check whether `account` may claim at `now` with `signature`.
pub fn authorize_claim(
    config: &TokenConfig,
    account: &AccountId,
    already_claimed: bool,
    signature: &[u8; 64],
    now: u64,
) -> Result<(), ClaimError> {
    if already_claimed {
        return Err(ClaimError::AlreadyClaimed);
    }
    if !config.claim_window_open(now) {
        return Err(ClaimError::Expired {
            now,
            deadline: config.claim_deadline,
        });
    }
    verify_claim(&config.authorizer, account, signature).map_err(|_| {
        warn!(%account, "claim signature rejected");
        ClaimError::Unauthorized
    })
}

/// Authorize and stage a claim: flag the account, then route the
/// [`CLAIM_AMOUNT`] grant through the correction ledger.
///
/// Returns the granted amount. The caller still has to mint it on the ledger.
pub fn stage_claim(
    txn: &mut BookTxn<'_>,
    config: &TokenConfig,
    account: &AccountId,
    signature: &[u8; 64],
    now: u64,
) -> Result<u64, DivvyError> {
    let already_claimed = txn.account(account).claimed;
    authorize_claim(config, account, already_claimed, signature, now)?;
    txn.mark_claimed(account);
    txn.apply_balance_change(account, BalanceDelta::Increase(CLAIM_AMOUNT))?;
    Ok(CLAIM_AMOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::DividendBook;
    use divvy_core::constants::MAGNITUDE;
    use divvy_core::crypto::{KeyPair, sign_claim};

    const DEADLINE: u64 = 10_000;

    fn setup() -> (KeyPair, TokenConfig) {
        let authorizer = KeyPair::from_secret_bytes([0xA0; 32]);
        let config = TokenConfig::new(authorizer.public_key(), DEADLINE);
        (authorizer, config)
    }

    #[test]
    fn valid_claim_authorized() {
        let (auth, cfg) = setup();
        let account = AccountId([1; 32]);
        let sig = sign_claim(&auth, &account);
        assert_eq!(authorize_claim(&cfg, &account, false, &sig, 0), Ok(()));
        assert_eq!(authorize_claim(&cfg, &account, false, &sig, DEADLINE - 1), Ok(()));
    }

    #[test]
    fn claim_at_deadline_expired() {
        let (auth, cfg) = setup();
        let account = AccountId([1; 32]);
        let sig = sign_claim(&auth, &account);
        assert_eq!(
            authorize_claim(&cfg, &account, false, &sig, DEADLINE),
            Err(ClaimError::Expired {
                now: DEADLINE,
                deadline: DEADLINE
            })
        );
    }

    #[test]
    fn wrong_signer_unauthorized() {
        let (_, cfg) = setup();
        let account = AccountId([1; 32]);
        let sig = sign_claim(&KeyPair::from_secret_bytes([0xB0; 32]), &account);
        assert_eq!(
            authorize_claim(&cfg, &account, false, &sig, 0),
            Err(ClaimError::Unauthorized)
        );
    }

    #[test]
    fn signature_for_other_account_unauthorized() {
        let (auth, cfg) = setup();
        let sig = sign_claim(&auth, &AccountId([2; 32]));
        assert_eq!(
            authorize_claim(&cfg, &AccountId([1; 32]), false, &sig, 0),
            Err(ClaimError::Unauthorized)
        );
    }

    #[test]
    fn check_order_claimed_then_expired_then_signature() {
        let (_, cfg) = setup();
        let account = AccountId([1; 32]);
        let garbage = [0u8; 64];
        assert_eq!(
            authorize_claim(&cfg, &account, true, &garbage, DEADLINE + 1),
            Err(ClaimError::AlreadyClaimed)
        );
        assert!(matches!(
            authorize_claim(&cfg, &account, false, &garbage, DEADLINE + 1),
            Err(ClaimError::Expired { .. })
        ));
    }

    #[test]
    fn stage_claim_flags_and_corrects() {
        let (auth, cfg) = setup();
        let account = AccountId([1; 32]);
        let sig = sign_claim(&auth, &account);

        let mut book = DividendBook::new();
        let mut txn = book.begin();
        txn.add_per_share(MAGNITUDE).unwrap();
        assert_eq!(stage_claim(&mut txn, &cfg, &account, &sig, 0).unwrap(), CLAIM_AMOUNT);
        let record = txn.account(&account);
        assert!(record.claimed);
        // Joining at 1 unit per share must not inherit past dividends.
        assert!(record.correction.is_negative());
        let changes = txn.finish();
        book.apply(changes);
        assert_eq!(book.accumulative_dividend_of(&account, CLAIM_AMOUNT).unwrap(), 0);
    }

    #[test]
    fn stage_claim_twice_in_one_txn_rejected() {
        let (auth, cfg) = setup();
        let account = AccountId([1; 32]);
        let sig = sign_claim(&auth, &account);
        let book = DividendBook::new();
        let mut txn = book.begin();
        stage_claim(&mut txn, &cfg, &account, &sig, 0).unwrap();
        assert_eq!(
            stage_claim(&mut txn, &cfg, &account, &sig, 0),
            Err(DivvyError::Claim(ClaimError::AlreadyClaimed))
        );
    }
}
