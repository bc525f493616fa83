//! Distribution schedule and era decay.
//!
//! A payment reaching the pool at time `now` is divided by `era + 1`, where
//! the era counts whole [`HALVING_PERIOD_SECS`] elapsed since the claim
//! deadline:
//!
//! - Era 0 (up to `deadline + 21 days`): full amount
//! - Era 1: amount / 2
//! - Era 2: amount / 3
//! - …
//! - Era 59: amount / 60
//! - Era 60+ ([`FINAL_ERA`]): nothing reaches the pool
//!
//! Every moment up to and including the deadline is era 0. Division
//! remainders are dropped and never carried into a later payment.

use serde::{Deserialize, Serialize};

use divvy_core::constants::{FINAL_ERA, HALVING_PERIOD_SECS, MAGNITUDE};
use divvy_core::error::DividendError;
use divvy_core::wide::{U256, widen};

/// Outcome of routing one payment through the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Era the payment fell in.
    pub era: u64,
    /// Portion of the payment credited to holders.
    pub contribution: u64,
    /// Amount added to the per-share accumulator.
    pub increment: U256,
}

impl Distribution {
    /// Whether the payment changed the accumulator at all.
    pub fn is_empty(&self) -> bool {
        self.increment.is_zero()
    }
}

/// Decay era at time `now`.
///
/// # Examples
///
/// ```
/// use divvy_core::constants::HALVING_PERIOD_SECS;
/// use divvy_dividend::schedule::era_at;
/// assert_eq!(era_at(1_000, 0), 0);
/// assert_eq!(era_at(1_000, 1_000), 0);
/// assert_eq!(era_at(1_000, 1_000 + HALVING_PERIOD_SECS), 1);
/// ```
pub fn era_at(claim_deadline: u64, now: u64) -> u64 {
    if now <= claim_deadline {
        return 0;
    }
    (now - claim_deadline) / HALVING_PERIOD_SECS
}

/// First timestamp belonging to `era` (for era 0: the deadline itself;
/// everything earlier is era 0 as well). Saturates at `u64::MAX`.
pub fn era_start(claim_deadline: u64, era: u64) -> u64 {
    claim_deadline.saturating_add(era.saturating_mul(HALVING_PERIOD_SECS))
}

/// Timestamp at which the next era begins after `now`.
///
/// Returns `None` once the final era has been reached (no further change).
pub fn next_era_at(claim_deadline: u64, now: u64) -> Option<u64> {
    let era = era_at(claim_deadline, now);
    if era >= FINAL_ERA {
        return None;
    }
    Some(era_start(claim_deadline, era + 1))
}

/// First timestamp at which payments no longer reach the pool.
pub fn distribution_end(claim_deadline: u64) -> u64 {
    era_start(claim_deadline, FINAL_ERA)
}

/// The part of `amount` credited to holders in `era`.
pub fn effective_contribution(amount: u64, era: u64) -> u64 {
    if era >= FINAL_ERA {
        return 0;
    }
    amount / (era + 1)
}

/// Accumulator increment for a contribution spread over `total_supply`.
///
/// A zero contribution is a no-op even on an empty ledger. A non-zero
/// contribution with zero supply is rejected.
pub fn per_share_increment(contribution: u64, total_supply: u64) -> Result<U256, DividendError> {
    if contribution == 0 {
        return Ok(U256::ZERO);
    }
    if total_supply == 0 {
        return Err(DividendError::DivisionByZero);
    }
    let scaled = widen(contribution)
        .checked_mul(MAGNITUDE)
        .ok_or(DividendError::ArithmeticOverflow)?;
    scaled
        .checked_div(widen(total_supply))
        .ok_or(DividendError::DivisionByZero)
}

/// Route a payment of `amount` at `now` through the schedule.
pub fn plan_distribution(
    claim_deadline: u64,
    amount: u64,
    now: u64,
    total_supply: u64,
) -> Result<Distribution, DividendError> {
    let era = era_at(claim_deadline, now);
    let contribution = effective_contribution(amount, era);
    let increment = per_share_increment(contribution, total_supply)?;
    Ok(Distribution {
        era,
        contribution,
        increment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use divvy_core::constants::COIN;
    use proptest::prelude::*;

    const DEADLINE: u64 = 1_700_000_000;

    // ------------------------------------------------------------------
    // era_at
    // ------------------------------------------------------------------

    #[test]
    fn era_before_deadline_is_zero() {
        assert_eq!(era_at(DEADLINE, 0), 0);
        assert_eq!(era_at(DEADLINE, DEADLINE - 1), 0);
    }

    #[test]
    fn era_at_deadline_is_zero() {
        assert_eq!(era_at(DEADLINE, DEADLINE), 0);
    }

    #[test]
    fn era_within_first_period_is_zero() {
        assert_eq!(era_at(DEADLINE, DEADLINE + HALVING_PERIOD_SECS - 1), 0);
    }

    #[test]
    fn era_increments_each_period() {
        assert_eq!(era_at(DEADLINE, DEADLINE + HALVING_PERIOD_SECS), 1);
        assert_eq!(era_at(DEADLINE, DEADLINE + 2 * HALVING_PERIOD_SECS), 2);
        assert_eq!(
            era_at(DEADLINE, DEADLINE + FINAL_ERA * HALVING_PERIOD_SECS),
            FINAL_ERA
        );
    }

    #[test]
    fn era_far_future() {
        assert_eq!(era_at(0, u64::MAX), u64::MAX / HALVING_PERIOD_SECS);
    }

    // ------------------------------------------------------------------
    // era_start / next_era_at / distribution_end
    // ------------------------------------------------------------------

    #[test]
    fn era_start_values() {
        assert_eq!(era_start(DEADLINE, 0), DEADLINE);
        assert_eq!(era_start(DEADLINE, 3), DEADLINE + 3 * HALVING_PERIOD_SECS);
        assert_eq!(era_start(DEADLINE, u64::MAX), u64::MAX);
    }

    #[test]
    fn era_start_is_in_its_era() {
        for era in [1, 2, 17, FINAL_ERA - 1, FINAL_ERA] {
            assert_eq!(era_at(DEADLINE, era_start(DEADLINE, era)), era);
            assert_eq!(era_at(DEADLINE, era_start(DEADLINE, era) - 1), era - 1);
        }
    }

    #[test]
    fn next_era_before_deadline() {
        assert_eq!(
            next_era_at(DEADLINE, 0),
            Some(DEADLINE + HALVING_PERIOD_SECS)
        );
    }

    #[test]
    fn next_era_mid_era() {
        let now = DEADLINE + 5 * HALVING_PERIOD_SECS + 10;
        assert_eq!(
            next_era_at(DEADLINE, now),
            Some(DEADLINE + 6 * HALVING_PERIOD_SECS)
        );
    }

    #[test]
    fn next_era_last_transition() {
        let now = era_start(DEADLINE, FINAL_ERA - 1);
        assert_eq!(next_era_at(DEADLINE, now), Some(distribution_end(DEADLINE)));
    }

    #[test]
    fn next_era_none_after_final() {
        assert_eq!(next_era_at(DEADLINE, distribution_end(DEADLINE)), None);
    }

    #[test]
    fn distribution_end_value() {
        assert_eq!(
            distribution_end(DEADLINE),
            DEADLINE + FINAL_ERA * HALVING_PERIOD_SECS
        );
    }

    // ------------------------------------------------------------------
    // effective_contribution
    // ------------------------------------------------------------------

    #[test]
    fn contribution_era_zero_is_full() {
        assert_eq!(effective_contribution(1_000, 0), 1_000);
    }

    #[test]
    fn contribution_divides_by_era_plus_one() {
        assert_eq!(effective_contribution(1_000, 1), 500);
        assert_eq!(effective_contribution(1_000, 2), 333);
        assert_eq!(effective_contribution(1_000, 3), 250);
    }

    #[test]
    fn contribution_before_final_era() {
        assert_eq!(effective_contribution(6_000, FINAL_ERA - 1), 6_000 / FINAL_ERA);
        assert_eq!(effective_contribution(6_000, FINAL_ERA - 1), 100);
    }

    #[test]
    fn contribution_at_and_after_final_era_is_zero() {
        assert_eq!(effective_contribution(u64::MAX, FINAL_ERA), 0);
        assert_eq!(effective_contribution(u64::MAX, u64::MAX), 0);
    }

    #[test]
    fn contribution_small_amount_truncates_to_zero() {
        assert_eq!(effective_contribution(2, 2), 0);
    }

    // ------------------------------------------------------------------
    // per_share_increment
    // ------------------------------------------------------------------

    #[test]
    fn increment_zero_contribution_is_zero_even_without_supply() {
        assert_eq!(per_share_increment(0, 0).unwrap(), U256::ZERO);
    }

    #[test]
    fn increment_zero_supply_rejected() {
        assert_eq!(
            per_share_increment(1, 0),
            Err(DividendError::DivisionByZero)
        );
    }

    #[test]
    fn increment_exact() {
        assert_eq!(per_share_increment(10, 10).unwrap(), MAGNITUDE);
        assert_eq!(per_share_increment(5, 10).unwrap(), MAGNITUDE / widen(2));
    }

    #[test]
    fn increment_truncates() {
        let inc = per_share_increment(1, 3).unwrap();
        assert_eq!(inc, MAGNITUDE / widen(3));
        assert!(inc * widen(3) < MAGNITUDE);
    }

    #[test]
    fn increment_max_values_fit() {
        let inc = per_share_increment(u64::MAX, 1).unwrap();
        assert_eq!(inc, widen(u64::MAX) * MAGNITUDE);
    }

    // ------------------------------------------------------------------
    // plan_distribution
    // ------------------------------------------------------------------

    #[test]
    fn plan_at_final_era_is_empty() {
        let d = plan_distribution(DEADLINE, 1_000 * COIN, distribution_end(DEADLINE), COIN).unwrap();
        assert_eq!(d.era, FINAL_ERA);
        assert_eq!(d.contribution, 0);
        assert!(d.is_empty());
    }

    #[test]
    fn plan_one_before_final_era() {
        let now = era_start(DEADLINE, FINAL_ERA - 1);
        let amount = 600 * COIN;
        let d = plan_distribution(DEADLINE, amount, now, COIN).unwrap();
        assert_eq!(d.era, FINAL_ERA - 1);
        assert_eq!(d.contribution, amount / FINAL_ERA);
        assert_eq!(d.increment, widen(amount / FINAL_ERA) * MAGNITUDE / widen(COIN));
    }

    #[test]
    fn plan_past_final_era_ignores_zero_supply() {
        let d = plan_distribution(DEADLINE, 1_000, u64::MAX, 0).unwrap();
        assert!(d.is_empty());
    }

    // ------------------------------------------------------------------
    // proptest
    // ------------------------------------------------------------------

    proptest! {
        #[test]
        fn era_monotonic_in_time(a in 0u64..=u64::MAX, b in 0u64..=u64::MAX) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(era_at(DEADLINE, lo) <= era_at(DEADLINE, hi));
        }

        #[test]
        fn contribution_never_exceeds_amount(amount in 0u64..=u64::MAX, era in 0u64..200) {
            prop_assert!(effective_contribution(amount, era) <= amount);
        }

        #[test]
        fn contribution_non_increasing_in_era(amount in 0u64..=u64::MAX, era in 0u64..FINAL_ERA) {
            prop_assert!(effective_contribution(amount, era + 1) <= effective_contribution(amount, era));
        }

        #[test]
        fn increment_times_supply_bounded(contribution in 1u64..=u64::MAX, supply in 1u64..=u64::MAX) {
            let inc = per_share_increment(contribution, supply).unwrap();
            prop_assert!(inc * widen(supply) <= widen(contribution) * MAGNITUDE);
        }
    }
}
