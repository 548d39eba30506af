//! # Money Module
//!
//! Provides the `Money` and `TaxRate` types for handling monetary values
//! safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Construction documents also need fractional quantities:                │
//! │    2.5 m² of tiling × 48.30 €/m² at 10% VAT                             │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Exact base-10 arithmetic, no intermediate rounding.                  │
//! │    Rounding happens ONCE, at presentation, via Money::rounded().        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use devis_core::money::{Money, TaxRate};
//! use rust_decimal::Decimal;
//!
//! let unit_price = Money::from_major(100);          // 100.00
//! let line = unit_price * Decimal::from(2);         // quantity 2
//! let tax = line.tax_at(TaxRate::standard());       // 20% VAT
//! assert_eq!(tax, Money::from_major(40));
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the document's currency, backed by exact decimal
/// arithmetic.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative amounts stay representable for credit
///   lines and refunds
/// - **Single field tuple struct**: zero-cost abstraction over `Decimal`
/// - **No rounding inside the engine**: totals are carried at full precision
///   and rounded only for display
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a raw decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use devis_core::money::Money;
    ///
    /// let price = Money::from_major(250); // 250.00
    /// assert!(price.is_positive());
    /// ```
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use devis_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // 10.99
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the larger of two amounts.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    /// Applies a tax rate and returns the tax amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use devis_core::money::{Money, TaxRate};
    ///
    /// let base = Money::from_major(150);
    /// let tax = base.tax_at(TaxRate::intermediate()); // 10%
    /// assert_eq!(tax, Money::from_major(15));
    /// ```
    pub fn tax_at(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.as_fraction())
    }

    /// Rounds to currency precision (2 decimal places, half away from zero).
    ///
    /// This is a PRESENTATION operation. The totals engine never calls it;
    /// callers round once, at the edge, when formatting or printing.
    ///
    /// ## Example
    /// ```rust
    /// use devis_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let precise = Money::new(Decimal::new(10825, 3)); // 10.825
    /// assert_eq!(precise.rounded(), Money::new(Decimal::new(1083, 2))); // 10.83
    /// ```
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display at currency precision. For debugging and plain-text output;
/// locale-aware formatting belongs to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded().0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Money)
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

/// Multiplication by a decimal factor (quantities, discount ratios).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// A VAT rate expressed as a percentage (`20` means 20%).
///
/// ## Why a percentage Decimal?
/// Rates differ per line (standard works vs. renovation vs. energy
/// renovation), and French rates include fractional percentages (5.5%).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a rate from a percentage value (`20` → 20%).
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        TaxRate(percent)
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a multiplier fraction (`20%` → `0.20`).
    #[inline]
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Zero rate (exports, some subcontracting regimes).
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// French standard rate: 20%, new construction and supplies.
    #[inline]
    pub fn standard() -> Self {
        TaxRate(Decimal::new(20, 0))
    }

    /// French intermediate rate: 10%, renovation of housing over two years old.
    #[inline]
    pub fn intermediate() -> Self {
        TaxRate(Decimal::new(10, 0))
    }

    /// French reduced rate: 5.5%, energy renovation works.
    #[inline]
    pub fn reduced() -> Self {
        TaxRate(Decimal::new(55, 1))
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

impl FromStr for TaxRate {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(TaxRate)
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
    fn test_constructors() {
        assert_eq!(Money::from_major(10).amount(), dec!(10));
        assert_eq!(Money::from_minor(1099).amount(), dec!(10.99));
        assert_eq!(Money::new(dec!(48.30)).amount(), dec!(48.30));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(10);
        let b = Money::new(dec!(5.50));

        assert_eq!((a + b).amount(), dec!(15.50));
        assert_eq!((a - b).amount(), dec!(4.50));
        assert_eq!((b * dec!(2)).amount(), dec!(11.00));
        assert_eq!((-b).amount(), dec!(-5.50));

        let mut c = a;
        c += b;
        c -= Money::from_major(1);
        assert_eq!(c.amount(), dec!(14.50));
    }

    #[test]
    fn test_fractional_quantity_times_price() {
        // 2.5 m² × 48.30 €/m² = 120.75 exactly, no binary noise
        let line = Money::new(dec!(48.30)) * dec!(2.5);
        assert_eq!(line.amount(), dec!(120.750));
    }

    #[test]
    fn test_tax_at() {
        let base = Money::from_major(100);
        assert_eq!(base.tax_at(TaxRate::standard()).amount(), dec!(20));
        assert_eq!(base.tax_at(TaxRate::reduced()).amount(), dec!(5.5));
        assert_eq!(base.tax_at(TaxRate::zero()).amount(), dec!(0));
    }

    #[test]
    fn test_rounded_half_away_from_zero() {
        assert_eq!(Money::new(dec!(10.825)).rounded().amount(), dec!(10.83));
        assert_eq!(Money::new(dec!(-10.825)).rounded().amount(), dec!(-10.83));
        assert_eq!(Money::new(dec!(10.824)).rounded().amount(), dec!(10.82));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_major(5).to_string(), "5.00");
        assert_eq!(Money::new(dec!(-5.5)).to_string(), "-5.50");
        assert_eq!(Money::new(dec!(10.825)).to_string(), "10.83");
        assert_eq!(TaxRate::reduced().to_string(), "5.5%");
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_major(1).is_positive());
        assert!(Money::from_major(-1).is_negative());
        assert_eq!(Money::from_major(-3).abs(), Money::from_major(3));
    }

    #[test]
    fn test_max() {
        let a = Money::from_major(2);
        let b = Money::from_major(7);
        assert_eq!(a.max(b), b);
        assert_eq!(Money::zero().max(Money::from_major(-4)), Money::zero());
    }

    #[test]
    fn test_parse_roundtrip() {
        let m: Money = "1234.5678".parse().unwrap();
        assert_eq!(m.amount(), dec!(1234.5678));
        let r: TaxRate = "5.5".parse().unwrap();
        assert_eq!(r, TaxRate::reduced());
    }
}
