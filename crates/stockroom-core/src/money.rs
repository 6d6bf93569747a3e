//! # Money Module
//!
//! Integer money and basis-point rates.
//!
//! ## Why Integers?
//! ```text
//! 0.1 + 0.2 = 0.30000000000000004   (f64)
//! 10 + 20  = 30                     (cents)
//! ```
//! Every price, total and limit in Stockroom is stored in the smallest
//! currency unit. Rates (tax, discount) are basis points: 1 bps = 0.01%.
//!
//! ## Rounding
//! Tax is rounded half-to-even ("banker's rounding") on each line, so a
//! long order does not drift upward from always rounding halves up.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

const BPS_DENOMINATOR: i128 = 10_000;

// =============================================================================
// Money
// =============================================================================

/// An amount of money in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates money from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Returns the amount in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// The cents part in 0..=99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Clamps negative amounts to zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Tax owed on this amount at the given rate, rounded half-to-even.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::{Money, TaxRate};
    ///
    /// // 0.50 at 10% = 0.05 exactly
    /// assert_eq!(Money::from_cents(50).calculate_tax(TaxRate::from_bps(1000)).cents(), 5);
    /// // 0.25 at 10% = 0.025 -> 0.02 (half to even)
    /// assert_eq!(Money::from_cents(25).calculate_tax(TaxRate::from_bps(1000)).cents(), 2);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(round_bps(self.0 as i128 * rate.bps() as i128))
    }

    /// Line total: unit price times quantity, or `None` on overflow.
    #[inline]
    pub fn multiply_quantity(&self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// `self + rhs`, or `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// `self - rhs`, or `None` on overflow.
    #[inline]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

/// Divides a basis-point product by 10,000 with half-to-even rounding.
fn round_bps(numerator: i128) -> i64 {
    let negative = numerator < 0;
    let n = numerator.abs();
    let mut quotient = n / BPS_DENOMINATOR;
    let twice_remainder = (n % BPS_DENOMINATOR) * 2;

    if twice_remainder > BPS_DENOMINATOR
        || (twice_remainder == BPS_DENOMINATOR && quotient % 2 == 1)
    {
        quotient += 1;
    }

    let result = quotient as i64;
    if negative {
        -result
    } else {
        result
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Rate in basis points (825 = 8.25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_and_parts() {
        let m = Money::from_cents(1099);
        assert_eq!(m.cents(), 1099);
        assert_eq!(m.dollars(), 10);
        assert_eq!(m.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn test_tax_rounds_half_to_even() {
        let ten_pct = TaxRate::from_bps(1000);
        // 0.025 -> 0.02, 0.035 -> 0.04, 0.045 -> 0.04
        assert_eq!(Money::from_cents(25).calculate_tax(ten_pct).cents(), 2);
        assert_eq!(Money::from_cents(35).calculate_tax(ten_pct).cents(), 4);
        assert_eq!(Money::from_cents(45).calculate_tax(ten_pct).cents(), 4);
    }

    #[test]
    fn test_tax_non_half_rounds_nearest() {
        // 10.99 * 8.25% = 0.906675
        let tax = Money::from_cents(1099).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 91);

        // 1.00 * 8.25% = 0.0825
        let tax = Money::from_cents(100).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 8);
    }

    #[test]
    fn test_tax_zero_rate() {
        assert!(Money::from_cents(9999)
            .calculate_tax(TaxRate::zero())
            .is_zero());
    }

    #[test]
    fn test_negative_tax_mirrors_positive() {
        let ten_pct = TaxRate::from_bps(1000);
        assert_eq!(Money::from_cents(-25).calculate_tax(ten_pct).cents(), -2);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(Money::from_cents(250).multiply_quantity(4), Some(Money::from_cents(1000)));
        assert_eq!(max.multiply_quantity(2), None);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(10).checked_sub(Money::from_cents(25)),
            Some(Money::from_cents(-15))
        );
    }

    #[test]
    fn test_sum_and_non_negative() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 1000);
        assert_eq!((Money::from_cents(5) - Money::from_cents(10)).non_negative(), Money::zero());
    }

    #[test]
    fn test_tax_rate_percentage() {
        assert_eq!(TaxRate::from_bps(825).percentage(), 8.25);
    }
}
