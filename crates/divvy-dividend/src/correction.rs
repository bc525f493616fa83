//! Correction ledger.
//!
//! Entitlement is `(per_share * balance + correction) / MAGNITUDE`. When a
//! balance changes by `delta` the correction moves by `-per_share * delta`, so
//! the numerator, and with it the entitlement, stays exactly where it was.
//! A transfer applies this twice with opposite signs; mint and burn apply it
//! once, the issuance side having no account record at all.
//!
//! Corrections never trigger distributions.

use divvy_core::error::DividendError;
use divvy_core::wide::{SignedWide, U256, widen};

/// Direction and size of a balance change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceDelta {
    Increase(u64),
    Decrease(u64),
}

impl BalanceDelta {
    /// The delta taking a balance from `old` to `new`.
    pub fn between(old: u64, new: u64) -> Self {
        if new >= old {
            Self::Increase(new - old)
        } else {
            Self::Decrease(old - new)
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::Increase(v) | Self::Decrease(v) => *v,
        }
    }
}

/// `per_share * amount` in scaled units.
pub fn scaled(per_share: U256, amount: u64) -> Result<U256, DividendError> {
    per_share
        .checked_mul(widen(amount))
        .ok_or(DividendError::ArithmeticOverflow)
}

/// The correction after a balance change of `delta` at accumulator `per_share`.
pub fn apply_correction(
    correction: SignedWide,
    per_share: U256,
    delta: BalanceDelta,
) -> Result<SignedWide, DividendError> {
    let shift = scaled(per_share, delta.amount())?;
    let next = match delta {
        BalanceDelta::Increase(_) => correction.checked_sub(SignedWide::positive(shift)),
        BalanceDelta::Decrease(_) => correction.checked_add_unsigned(shift),
    };
    next.ok_or(DividendError::ArithmeticOverflow)
}
