//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer cents fix sums, but not averages:                              │
//! │    (10 × $5.00 + 20 × $7.01) / 30 = $6.34 exactly? No: $6.34000...     │
//! │    Weighted-average cost needs sub-cent precision to avoid drift        │
//! │                                                                         │
//! │  OUR SOLUTION: Base-10 Decimal (rust_decimal, 28 significant digits)    │
//! │    Sums, products and averages are exact for currency inputs           │
//! │    Rounding to cents happens only for display                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(1999);            // $19.99
//! let line = price.checked_mul_quantity(2).unwrap(); // $39.98
//! assert_eq!(line.to_string(), "$39.98");
//!
//! // NEVER do this:
//! // let bad = Money::from_f64(19.99); // NO SUCH METHOD EXISTS!
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::CoreError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store's single currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values are valid intermediate results
///   (e.g. a discount larger than the gross line)
/// - **Transparent serde**: serialized as a decimal string, `"19.99"`
/// - **Checked arithmetic**: every operation that can overflow has a
///   `checked_*` form; the posting engine only uses those
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount (full precision).
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to whole cents using Bankers Rounding (round half to even).
    ///
    /// Only used for presentation. Stored costs keep full precision.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use stockroom_core::money::Money;
    ///
    /// let m = Money::new(Decimal::new(12345, 3)); // 12.345
    /// assert_eq!(m.round_to_cents(), Money::from_cents(1234));
    /// ```
    pub fn round_to_cents(&self) -> Money {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(2);
        Money(rounded)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Line: 2 × $19.99
    ///      │
    ///      ▼
    /// checked_mul_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Gross: $39.98
    /// ```
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Divides by a quantity, `None` on zero quantity or overflow.
    pub fn checked_div_quantity(&self, qty: i64) -> Option<Money> {
        if qty == 0 {
            return None;
        }
        self.0.checked_div(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts two amounts, `None` on overflow.
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount rounded to cents, e.g. `$6.00` or `-$5.50`.
///
/// ## Note
/// This is for logs and debugging. The UI formats from the serialized string.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}${}", sign, rounded.abs())
    }
}

/// Parses the canonical decimal string form (`"19.99"`), as stored in SQLite.
impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|_| CoreError::InvalidMoney(s.to_string()))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(1099).amount(), dec!(10.99));
        assert_eq!(Money::from_cents(-550).amount(), dec!(-5.50));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::new(dec!(6)).to_string(), "$6.00");
    }

    #[test]
    fn test_decimal_sum_has_no_float_error() {
        // 0.1 + 0.2 is exactly 0.3 in decimal
        let total: Money = [Money::new(dec!(0.1)), Money::new(dec!(0.2))]
            .into_iter()
            .sum();
        assert_eq!(total.amount(), dec!(0.3));
    }

    #[test]
    fn test_bankers_rounding() {
        assert_eq!(Money::new(dec!(0.125)).round_to_cents().amount(), dec!(0.12));
        assert_eq!(Money::new(dec!(0.135)).round_to_cents().amount(), dec!(0.14));
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_cents(1999);
        assert_eq!(price.checked_mul_quantity(2), Some(Money::from_cents(3998)));
        assert_eq!(price.checked_div_quantity(0), None);
        assert_eq!(
            Money::from_cents(1000).checked_div_quantity(4),
            Some(Money::from_cents(250))
        );
        assert_eq!(Money::new(Decimal::MAX).checked_add(Money::from_cents(100)), None);
    }

    #[test]
    fn test_parse_stored_form() {
        let parsed: Money = "6.333333333333333333333333333".parse().unwrap();
        assert_eq!(parsed.round_to_cents(), Money::from_cents(633));
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(1999)).unwrap();
        assert_eq!(json, "\"19.99\"");
    }

    #[test]
    fn test_negative_checks() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(!Money::from_cents(1).is_negative());
    }
}
