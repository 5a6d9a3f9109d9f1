//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Float:   0.1 + 0.2            = 0.30000000000000004                    │
//! │  Integer: 10 + 20 centavos     = 30 centavos                            │
//! │                                                                         │
//! │  A sale of 3 × R$ 19,90 with R$ 0,70 discount must come out at exactly  │
//! │  R$ 59,00, and the remaining balance must hit exactly zero when the     │
//! │  last installment lands. Only integers give that.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Parsing typed amounts ("159,90") and locale formatting ("R$ 1.234,56")
//! happen at the app boundary, never here.
//!
//! ## Usage
//! ```rust
//! use tillbook_core::money::Money;
//!
//! let price = Money::from_cents(1990);
//! let subtotal = price * 3;
//! let total = (subtotal - Money::from_cents(70)).clamp_non_negative();
//! assert_eq!(total.cents(), 5900);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest currency unit).
///
/// Signed so intermediate results (`subtotal - discount`, a negative
/// balance) are representable; stored amounts are clamped where the domain
/// requires non-negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use tillbook_core::money::Money;
    ///
    /// let price = Money::from_cents(15990); // R$ 159,90
    /// assert_eq!(price.cents(), 15990);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// ```rust
    /// use tillbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(250, 0).cents(), 25000);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole reais, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Centavos portion, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Floors the value at zero.
    ///
    /// Used wherever the domain says "never below zero": sale totals after
    /// discount, remaining balances after a payment.
    ///
    /// ```rust
    /// use tillbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-300).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(300).clamp_non_negative().cents(), 300);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies by an item quantity. `None` on overflow.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds, pinning at the `i64` bounds.
    ///
    /// Aggregates over stored records use this; a ledger total must never
    /// panic on imported data.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `-12.34` rendering for logs. The app formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Saturating, so ledger totals over any stored data stay defined.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
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
    fn test_parts() {
        let money = Money::from_cents(15990);
        assert_eq!(money.major(), 159);
        assert_eq!(money.minor(), 90);

        let negative = Money::from_cents(-550);
        assert_eq!(negative.major(), -5);
        assert_eq!(negative.minor(), 50);
    }

    #[test]
    fn test_arithmetic() {
        let mut total = Money::from_cents(1990) * 3;
        assert_eq!(total.cents(), 5970);

        total -= Money::from_cents(70);
        assert_eq!(total.cents(), 5900);

        total += Money::from_cents(100);
        assert_eq!(total, Money::from_cents(6000));
        assert_eq!(Money::from_cents(250).multiply_quantity(4), Some(Money::from_cents(1000)));
    }

    #[test]
    fn test_checked_and_saturating_at_bounds() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(3), None);
        assert_eq!(huge.checked_add(huge), Some(Money::from_cents(i64::MAX - 1)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);

        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.saturating_add(max), max);
        assert_eq!(
            Money::from_cents(i64::MIN).saturating_sub(max),
            Money::from_cents(i64::MIN)
        );
    }

    #[test]
    fn test_clamp_non_negative() {
        let discounted = Money::from_cents(1000) - Money::from_cents(1500);
        assert!(discounted.is_negative());
        assert!(discounted.clamp_non_negative().is_zero());
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(4000),
            Money::from_cents(6000),
            Money::from_cents(25),
        ];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 10025);
        assert_eq!(by_ref, by_value);

        let max = Money::from_cents(i64::MAX);
        assert_eq!([max, max].iter().sum::<Money>(), max);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "12.34");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }
}
