//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in euros only, so a [`Price`] is a bare decimal
//! amount. The remote API sends prices as JSON numbers; the cart snapshot
//! stores them as strings to keep every digit. Both forms deserialize.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative euro amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero euros.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from euro cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display with two decimals, e.g. `€12.50`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("€{:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_two_decimals() {
        assert_eq!(Price::from_cents(1250).display(), "€12.50");
        assert_eq!(Price::from_cents(300).to_string(), "3.00");
        assert_eq!(Price::ZERO.display(), "€0.00");
    }

    #[test]
    fn test_deserializes_from_number_and_string() {
        let from_number: Price = serde_json::from_str("12.5").unwrap_or_default();
        let from_string: Price = serde_json::from_str("\"19.99\"").unwrap_or_default();
        assert_eq!(from_number, Price::from_cents(1250));
        assert_eq!(from_string, Price::from_cents(1999));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_cents(250).times(2), Price::from_cents(100) * 3]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(800));
    }
}
