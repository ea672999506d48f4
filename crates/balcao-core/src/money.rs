//! # Money Module
//!
//! Fixed-point numeric types for every value the order and fee math touches.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: three integer scales                                    │
//! │    Money     → cents          (R$ 10,99  = 1099)                        │
//! │    Quantity  → thousandths    (1,250 kg  = 1250)                        │
//! │    Rate      → basis points   (2,49%     = 249)                         │
//! │                                                                         │
//! │  Every product of two scales is rounded ONCE, half away from zero,     │
//! │  back to cents.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use balcao_core::money::{Money, Quantity, Rate};
//!
//! let price = Money::from_cents(1099);           // R$ 10,99
//! let weight = Quantity::from_thousandths(1500);  // 1,5 kg
//! assert_eq!(price.times_quantity(weight).cents(), 1649);
//!
//! let fee = Money::from_cents(10000).percent_of(Rate::from_bps(300));
//! assert_eq!(fee.cents(), 300);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Divides `numerator` by `denominator`, rounding half away from zero.
///
/// `denominator` must be positive.
pub(crate) fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// Narrows an i128 intermediate back to i64, clamping at the bounds.
fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: totals and net amounts are allowed to go negative
///   (a discount larger than the subtotal is a credit, not a panic)
/// - **Single field tuple struct**: serializes as a bare integer
/// - **Saturating arithmetic**: a value past the i64 range clamps at the
///   bound instead of wrapping to the opposite sign
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CatalogEntry.price ──► LineItem.unit_price ──► LineItem.line_total     │
/// │                                                                         │
/// │  Order.items_subtotal + freight − discount ──► grand_total             │
/// │                                                                         │
/// │  grand_total ──► FeeBreakdown.gross ──► fee_amount / net_amount        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
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

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies by a fractional quantity, rounding to the cent.
    ///
    /// ## Example
    /// ```text
    /// R$ 7,99/kg × 0,333 kg = R$ 2,66067 → R$ 2,66
    /// ```
    pub fn times_quantity(&self, qty: Quantity) -> Money {
        let raw = self.0 as i128 * qty.thousandths() as i128;
        Money(saturate(div_round(raw, Quantity::SCALE as i128)))
    }

    /// Returns `rate` of this amount, rounded to the cent.
    ///
    /// Used for percentage discounts and ad-valorem payment fees.
    pub fn percent_of(&self, rate: Rate) -> Money {
        let raw = self.0 as i128 * rate.bps() as i128;
        Money(saturate(div_round(raw, Rate::SCALE as i128)))
    }

    /// Divides evenly into `parts`, rounding to the cent.
    ///
    /// Returns the amount unchanged when `parts` is zero.
    pub fn split(&self, parts: u32) -> Money {
        if parts == 0 {
            return *self;
        }
        Money(saturate(div_round(self.0 as i128, parts as i128)))
    }
}

/// Brazilian display format, for logs and the console.
///
/// ```rust
/// use balcao_core::money::Money;
///
/// assert_eq!(Money::from_cents(123456).to_string(), "R$ 1234,56");
/// assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5,50");
/// ```
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}R$ {},{:02}", sign, abs / 100, abs % 100)
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
// Quantity Type
// =============================================================================

/// A quantity in thousandths of a unit.
///
/// Weight-based products are sold in fractions ("0,350 kg"), so quantities
/// cannot be whole integers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Thousandths per unit.
    pub const SCALE: i64 = 1000;

    #[inline]
    pub const fn from_thousandths(thousandths: i64) -> Self {
        Quantity(thousandths)
    }

    /// Whole units.
    #[inline]
    pub const fn units(units: i64) -> Self {
        Quantity(units * Self::SCALE)
    }

    #[inline]
    pub const fn one() -> Self {
        Quantity(Self::SCALE)
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn thousandths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let frac = abs % Self::SCALE as u64;
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}{},{}", sign, whole, digits.trim_end_matches('0'))
        }
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage in basis points.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Card acquirers quote fees with two
/// decimals ("3,19%"), which is exactly 319 bps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Basis points per 100%.
    pub const SCALE: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Whole percent, e.g. `Rate::percent(3)` is 3%.
    #[inline]
    pub const fn percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "R$ 10,99");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0,05");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5,50");
        assert_eq!(Quantity::from_thousandths(1250).to_string(), "1,25");
        assert_eq!(Quantity::units(3).to_string(), "3");
        assert_eq!(Rate::from_bps(319).to_string(), "3,19%");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_times_quantity_rounds_half_away_from_zero() {
        let per_kg = Money::from_cents(799);
        // 7,99 × 0,333 = 2,66067
        assert_eq!(per_kg.times_quantity(Quantity::from_thousandths(333)).cents(), 266);
        // 0,01 × 0,5 = 0,005 → 0,01
        let cent = Money::from_cents(1);
        assert_eq!(cent.times_quantity(Quantity::from_thousandths(500)).cents(), 1);
        assert_eq!((-cent).times_quantity(Quantity::from_thousandths(500)).cents(), -1);
    }

    #[test]
    fn test_percent_of() {
        let gross = Money::from_cents(10000);
        assert_eq!(gross.percent_of(Rate::percent(3)).cents(), 300);
        assert_eq!(gross.percent_of(Rate::from_bps(249)).cents(), 249);
        // R$ 0,99 × 2,5% = 0,02475 → 0,02
        assert_eq!(Money::from_cents(99).percent_of(Rate::from_bps(250)).cents(), 2);
    }

    #[test]
    fn test_overflow_clamps_instead_of_wrapping() {
        let huge = Money::from_cents(i64::MAX - 10);

        assert_eq!((huge + Money::from_cents(100)).cents(), i64::MAX);
        assert_eq!((-huge - Money::from_cents(100)).cents(), i64::MIN);
        assert_eq!(huge.times_quantity(Quantity::units(2)).cents(), i64::MAX);
        assert_eq!((-huge).times_quantity(Quantity::units(2)).cents(), i64::MIN);
        assert_eq!(huge.percent_of(Rate::percent(300)).cents(), i64::MAX);
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);

        let mut total = huge;
        total += huge;
        assert!(total.is_positive());
        let sum: Money = [huge, huge, Money::from_cents(1)].iter().sum();
        assert_eq!(sum.cents(), i64::MAX);
    }

    #[test]
    fn test_split() {
        assert_eq!(Money::from_cents(10000).split(3).cents(), 3333);
        assert_eq!(Money::from_cents(10000).split(0).cents(), 10000);
    }
}
