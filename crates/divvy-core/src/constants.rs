//! Token constants. All amounts in base units (1 DIVVY = 10^8 units).

use crate::wide::U256;

/// Number of decimal places of the base unit.
pub const DECIMALS: u32 = 8;

pub const COIN: u64 = 100_000_000;

/// Allocation granted by a successful claim: one whole coin.
pub const CLAIM_AMOUNT: u64 = COIN;

/// Fixed-point scale of the per-share accumulator and of correction terms.
///
/// `2^128`, written as little-endian 64-bit limbs.
///
/// # Examples
///
/// ```
/// use divvy_core::constants::MAGNITUDE;
/// use divvy_core::wide::U256;
/// assert_eq!(MAGNITUDE, U256::from(1u64) << 128usize);
/// ```
pub const MAGNITUDE: U256 = U256::from_limbs([0, 0, 1, 0]);

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Length of one decay era after the claim deadline.
pub const HALVING_PERIOD_SECS: u64 = 21 * SECONDS_PER_DAY;

/// First era in which incoming payments no longer reach the dividend pool.
pub const FINAL_ERA: u64 = 60;

/// Domain separator prepended to every claim message before hashing.
pub const CLAIM_DOMAIN_TAG: &[u8] = b"divvy/claim/v1";
