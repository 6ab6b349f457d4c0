//! # Money Module
//!
//! Provides the `Money` type for prices, fees and totals.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is an i64 count of minor units (Rupiah × 100)            │
//! │                                                                         │
//! │    Rp 10.000,00  ──►  Money(1_000_000)                                 │
//! │                                                                         │
//! │  Percentages are basis points (1% = 100 bps), applied as               │
//! │    (amount × bps ± 5000) / 10000        round half away from zero      │
//! │                                                                         │
//! │  A transaction total is Σ unit_price × quantity, exact to the cent.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//! use stockbook_core::types::Rate;
//!
//! let price = Money::from_cents(1_333_333); // Rp 13.333,33
//! let admin_fee = price.apply_rate(Rate::from_bps(1300));
//! assert_eq!(admin_fee.cents(), 173_333);
//!
//! let line_total = Money::from_cents(1_500_000) * 3_i64;
//! assert_eq!(line_total.cents(), 4_500_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

/// Denominator of a basis-point ratio.
pub(crate) const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (cents of a Rupiah).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.buying_price ──► pricing::recommended_price ──► final price   │
/// │                                                                         │
/// │  LineItem.unit_price × quantity ──► PendingTransaction::total          │
/// │                                                                         │
/// │  Transaction.total ──► SalesReport / ProfitReport / RestockReport      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1_500_000); // Rp 15.000,00
    /// assert_eq!(price.cents(), 1_500_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole Rupiah and a minor part.
    ///
    /// For negative amounts only the major part carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major.saturating_mul(100).saturating_sub(minor))
        } else {
            Money(major.saturating_mul(100).saturating_add(minor))
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-Rupiah portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Takes a percentage of this amount.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, mirrored for negative
    /// amounts so that -x rounds to the negation of x.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    /// use stockbook_core::types::Rate;
    ///
    /// let price = Money::from_cents(1_333_333);
    /// assert_eq!(price.apply_rate(Rate::from_bps(400)).cents(), 53_333);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Final price: Rp 13.333,33
    ///      │
    ///      ▼
    /// apply_rate(13%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Admin fee: Rp 1.733,33
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        self.checked_apply_rate(rate)
            .unwrap_or_else(|| Money::saturated(self.is_negative()))
    }

    /// Like [`Money::apply_rate`], but `None` when the result leaves i64.
    pub fn checked_apply_rate(&self, rate: Rate) -> Option<Money> {
        self.checked_scale(rate.bps() as i128, BPS_SCALE)
    }

    /// Multiplies by `numerator / denominator` with round half away from zero.
    ///
    /// Callers guarantee a positive denominator. Returns `None` instead of
    /// truncating when the result does not fit.
    pub(crate) fn checked_scale(&self, numerator: i128, denominator: i128) -> Option<Money> {
        let product = (self.0 as i128).checked_mul(numerator)?;
        let half = denominator / 2;
        let rounded = if product >= 0 {
            (product + half) / denominator
        } else {
            (product - half) / denominator
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1_500_000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 4_500_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    const fn saturated(negative: bool) -> Money {
        if negative {
            Money(i64::MIN)
        } else {
            Money(i64::MAX)
        }
    }

    /// Plain decimal rendering without currency symbol, for exports.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-1_333_333).to_decimal_string(), "-13333.33");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }

    /// Returns `part / self` in basis points, rounded half up.
    ///
    /// A zero or negative base yields zero.
    pub fn ratio_bps(&self, part: Money) -> i64 {
        if self.0 <= 0 {
            return 0;
        }
        part.checked_scale(BPS_SCALE, self.0 as i128)
            .unwrap_or_else(|| Money::saturated(part.is_negative()))
            .cents()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Operators saturate at the i64 bounds instead of panicking. Prices are
// capped by `MAX_PRICE_CENTS` on the way in, so real totals never get there.

/// Debug-friendly rendering. The dashboard formats amounts for its locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}.{:02}", sign, self.major().abs(), self.minor_part())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
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
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10_000, 0).cents(), 1_000_000);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1_333_333).to_string(), "Rp13333.33");
        assert_eq!(Money::from_cents(500).to_string(), "Rp5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-Rp5.50");
        assert_eq!(Money::zero().to_string(), "Rp0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3_i64).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 350);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 1000 × 8.25% = 82.5 → 83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.apply_rate(Rate::from_bps(825)).cents(), 83);

        // 1000 × 8.24% = 82.4 → 82
        assert_eq!(amount.apply_rate(Rate::from_bps(824)).cents(), 82);
    }

    #[test]
    fn test_apply_rate_is_symmetric_for_negatives() {
        let amount = Money::from_cents(-1000);
        assert_eq!(amount.apply_rate(Rate::from_bps(825)).cents(), -83);
    }

    #[test]
    fn test_scale() {
        // 1_000_000 × 10000 / 7500 = 1_333_333.33…
        let buying = Money::from_cents(1_000_000);
        assert_eq!(buying.checked_scale(10_000, 7_500), Some(Money::from_cents(1_333_333)));

        // 2 / 3 = 0.666… → 1
        assert_eq!(Money::from_cents(2).checked_scale(1, 3), Some(Money::from_cents(1)));
    }

    #[test]
    fn test_scale_out_of_range_is_none() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.checked_scale(3, 1), None);
        assert_eq!(huge.checked_scale(10_000, 1), None);
        assert_eq!((-huge).checked_scale(3, 1), None);
        assert_eq!(huge.checked_apply_rate(Rate::from_bps(30_000)), None);
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_panicking() {
        let huge = Money::from_cents(i64::MAX / 2);

        assert_eq!((huge * 3_i64).cents(), i64::MAX);
        assert_eq!(huge.multiply_quantity(-3).cents(), i64::MIN);
        assert_eq!((huge + huge + huge).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - huge).cents(), i64::MIN);
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);
        assert_eq!(huge.apply_rate(Rate::from_bps(30_000)).cents(), i64::MAX);

        let total: Money = [huge, huge, huge].iter().sum();
        assert_eq!(total.cents(), i64::MAX);

        let mut acc = huge;
        acc += huge;
        acc += huge;
        assert_eq!(acc.cents(), i64::MAX);
    }

    #[test]
    fn test_checked_helpers() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.checked_multiply_quantity(3), None);
        assert_eq!(huge.checked_add(huge + huge), None);
        assert_eq!(
            Money::from_cents(1_500_000).checked_multiply_quantity(3),
            Some(Money::from_cents(4_500_000))
        );
        assert_eq!(
            Money::from_cents(100).checked_add(Money::from_cents(250)),
            Some(Money::from_cents(350))
        );
    }

    #[test]
    fn test_ratio_bps() {
        let revenue = Money::from_cents(1_333_333);
        let profit = Money::from_cents(106_667);
        assert_eq!(revenue.ratio_bps(profit), 800);

        assert_eq!(Money::zero().ratio_bps(profit), 0);
        assert_eq!(revenue.ratio_bps(-Money::from_cents(133_333)), -1000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    /// A third of 10.00 taken three times loses a cent; totals are only
    /// exact when built from unit price × quantity.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3);
        let reconstructed = one_third * 3_i64;

        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
