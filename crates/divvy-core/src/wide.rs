//! 256-bit integer arithmetic for scaled dividend math.
//!
//! The per-share accumulator is an unsigned [`U256`] (from `ruint`) scaled by
//! [`MAGNITUDE`](crate::constants::MAGNITUDE). Correction terms need a sign,
//! so they use [`SignedWide`]: a sign flag plus a 256-bit magnitude.
//!
//! Every operation here is checked. Nothing wraps; callers turn `None` into
//! an overflow error and abort.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

pub use ruint::aliases::U256;

/// Widen a `u64` amount into a [`U256`].
pub const fn widen(value: u64) -> U256 {
    U256::from_limbs([value, 0, 0, 0])
}

/// Narrow a [`U256`] to `u64`, returning `None` if any high limb is set.
pub fn narrow(value: U256) -> Option<u64> {
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|&limb| limb != 0) {
        return None;
    }
    Some(limbs[0])
}

/// Signed 256-bit integer in sign-magnitude form.
///
/// Range is `(-2^256, 2^256)`. Zero is always non-negative, so equality and
/// hashing are structural.
///
/// # Examples
///
/// ```
/// use divvy_core::wide::{SignedWide, U256};
/// let a = SignedWide::positive(U256::from(5u64));
/// let b = SignedWide::negative(U256::from(8u64));
/// let sum = a.checked_add(b).unwrap();
/// assert!(sum.is_negative());
/// assert_eq!(sum.magnitude(), U256::from(3u64));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "SignedWideRepr", into = "SignedWideRepr")]
pub struct SignedWide {
    negative: bool,
    magnitude: U256,
}

#[derive(Serialize, Deserialize)]
struct SignedWideRepr {
    negative: bool,
    magnitude: U256,
}

impl From<SignedWideRepr> for SignedWide {
    fn from(repr: SignedWideRepr) -> Self {
        Self::from_parts(repr.negative, repr.magnitude)
    }
}

impl From<SignedWide> for SignedWideRepr {
    fn from(value: SignedWide) -> Self {
        Self {
            negative: value.negative,
            magnitude: value.magnitude,
        }
    }
}

impl SignedWide {
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: U256::ZERO,
    };

    /// Build from a sign flag and magnitude, normalizing negative zero.
    pub fn from_parts(negative: bool, magnitude: U256) -> Self {
        Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn positive(magnitude: U256) -> Self {
        Self::from_parts(false, magnitude)
    }

    pub fn negative(magnitude: U256) -> Self {
        Self::from_parts(true, magnitude)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Absolute value.
    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// `self + rhs`, or `None` if the magnitude leaves the 256-bit range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        if self.negative == rhs.negative {
            let magnitude = self.magnitude.checked_add(rhs.magnitude)?;
            return Some(Self::from_parts(self.negative, magnitude));
        }
        // Opposite signs: the larger magnitude wins the sign.
        match self.magnitude.cmp(&rhs.magnitude) {
            Ordering::Less => Some(Self::from_parts(
                rhs.negative,
                rhs.magnitude - self.magnitude,
            )),
            _ => Some(Self::from_parts(
                self.negative,
                self.magnitude - rhs.magnitude,
            )),
        }
    }

    /// `self - rhs`, or `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(-rhs)
    }

    /// `self + rhs` for an unsigned right-hand side.
    pub fn checked_add_unsigned(self, rhs: U256) -> Option<Self> {
        self.checked_add(Self::positive(rhs))
    }

    /// The value as an unsigned integer, or `None` if negative.
    pub fn to_unsigned(self) -> Option<U256> {
        if self.negative {
            None
        } else {
            Some(self.magnitude)
        }
    }
}

impl Neg for SignedWide {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_parts(!self.negative, self.magnitude)
    }
}

impl PartialOrd for SignedWide {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SignedWide {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
        }
    }
}

impl fmt::Display for SignedWide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}
