//! Money as an integer count of cents.
//!
//! All monetary values in the system are whole cents; decimal input is
//! converted once at the boundary with round-half-up, so later aggregation
//! (quantity × rate, subtotals) is exact integer arithmetic.

use core::iter::Sum;
use core::ops::{Add, AddAssign};
use serde::{Deserialize, Serialize};

/// A signed amount of money in cents. Signed because payroll adjustments
/// can be deductions.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Convert a decimal amount (e.g. `5410.77`) to cents, rounding halves
    /// up (away from zero for negative amounts).
    pub fn from_major_units(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    pub fn to_major_units(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Amount for `quantity` units billed at this rate.
    pub fn checked_mul(self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_input_rounds_half_up() {
        assert_eq!(Money::from_major_units(5410.77).cents(), 541077);
        assert_eq!(Money::from_major_units(0.005).cents(), 1);
        assert_eq!(Money::from_major_units(0.004).cents(), 0);
        assert_eq!(Money::from_major_units(-0.005).cents(), -1);
    }

    #[test]
    fn sum_and_mul_are_exact_in_cents() {
        let rate = Money::from_major_units(5410.77);
        let amount = rate.checked_mul(3).unwrap();
        assert_eq!(amount.cents(), 1_623_231);
        let total: Money = [rate, rate, rate].into_iter().sum();
        assert_eq!(total, amount);
    }

    #[test]
    fn display_renders_cents_with_two_digits() {
        assert_eq!(Money::from_cents(1_698_427).to_string(), "16984.27");
        assert_eq!(Money::from_cents(-50).to_string(), "-0.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }
}
