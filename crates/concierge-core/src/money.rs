//! # Money Module
//!
//! Provides the `Money` type used for every price that flows through the
//! booking engine.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRICES IN THE UPSELL WIDGETS                                           │
//! │                                                                         │
//! │  Room upgrade delta    +$45.00   (new room price − base room price)     │
//! │  Ocean view            +$30.00                                          │
//! │  Early check-in offer  −$10.00   (negative = discount)                  │
//! │                                                                         │
//! │  Stored as cents (i64):  4500, 3000, -1000                              │
//! │  There is no float representation, so a price is always finite.       │
//! │  Arithmetic saturates at the i64 bounds instead of wrapping.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use concierge_core::money::Money;
//!
//! let view = Money::from_cents(3000);
//! let three_nights = view.times(3);
//! assert_eq!(three_nights.cents(), 9000);
//!
//! let ten_percent = Money::from_cents(9000).percentage(1000);
//! assert_eq!(ten_percent.cents(), 900);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and downgrade deltas are negative prices
/// - **Newtype**: serializes as a bare integer for the widgets
/// - **Saturating**: arithmetic clamps at the i64 bounds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use concierge_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(150).cents(), 15_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units.saturating_mul(100))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies the amount by a count (nights, guests).
    #[inline]
    pub const fn times(&self, count: i64) -> Self {
        Money(self.0.saturating_mul(count))
    }

    /// Returns `bps` basis points of this amount (1000 = 10%).
    ///
    /// Rounds half away from zero so that a discount on a negative amount
    /// mirrors the discount on the positive one.
    ///
    /// ```rust
    /// use concierge_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1005).percentage(1000).cents(), 101);
    /// assert_eq!(Money::from_cents(-1005).percentage(1000).cents(), -101);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let raw = self.0 as i128 * bps as i128;
        let rounded = if raw >= 0 {
            (raw + 5000) / 10000
        } else {
            (raw - 5000) / 10000
        };
        Money(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display. The widgets do their own localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(4500).to_string(), "$45.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(b.times(4).cents(), 1000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!(-Money::from_cents(i64::MIN), max);
        assert_eq!(max.times(3), max);

        let total: Money = [max, Money::from_cents(1), Money::from_cents(1)].iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_sum_of_prices() {
        let prices = [
            Money::from_cents(3000),
            Money::from_cents(4500),
            Money::from_cents(-1000),
        ];
        let total: Money = prices.iter().sum();
        assert_eq!(total.cents(), 6500);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(Money::from_cents(10000).percentage(1000).cents(), 1000);
        assert_eq!(Money::from_cents(1005).percentage(1000).cents(), 101);
        assert_eq!(Money::from_cents(1004).percentage(1000).cents(), 100);
        assert_eq!(Money::from_cents(-1005).percentage(1000).cents(), -101);
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_cents(4500)).unwrap();
        assert_eq!(json, "4500");
        let back: Money = serde_json::from_str("-250").unwrap();
        assert_eq!(back, Money::from_cents(-250));
    }
}
