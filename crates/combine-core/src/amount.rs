//! Amount type representing a decimal number with a currency.
//!
//! An [`Amount`] is the unit of value carried by every posting. The plugin
//! only ever needs its sign and its negation, so arithmetic is limited to
//! what the rewrite uses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// An amount is a quantity paired with a currency.
///
/// # Examples
///
/// ```
/// use combine_core::Amount;
/// use rust_decimal_macros::dec;
///
/// let amount = Amount::new(dec!(500.00), "EUR");
/// assert!(amount.is_positive());
/// assert_eq!((-&amount).number, dec!(-500.00));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The decimal quantity
    pub number: Decimal,
    /// The currency code (e.g., "USD", "EUR")
    pub currency: String,
}

impl Amount {
    /// Create a new amount.
    #[must_use]
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    /// Create a zero amount with the given currency.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    /// Check if the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.number.is_sign_positive() && !self.number.is_zero()
    }

    /// Check if the amount is strictly less than zero.
    ///
    /// A negative zero (`-0.00`) is not negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.number.is_sign_negative() && !self.number.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount {
            number: -self.number,
            currency: self.currency.clone(),
        }
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            number: -self.number,
            currency: self.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new() {
        let amount = Amount::new(dec!(100.00), "USD");
        assert_eq!(amount.number, dec!(100.00));
        assert_eq!(amount.currency, "USD");
    }

    #[test]
    fn test_is_positive_negative() {
        let pos = Amount::new(dec!(100), "USD");
        let neg = Amount::new(dec!(-100), "USD");
        let zero = Amount::zero("USD");

        assert!(pos.is_positive());
        assert!(!pos.is_negative());
        assert!(neg.is_negative());
        assert!(!neg.is_positive());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(zero.is_zero());
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        let negative_zero = -Amount::zero("EUR");
        assert!(!negative_zero.is_negative());
        assert!(!negative_zero.is_positive());
    }

    #[test]
    fn test_neg() {
        let amount = Amount::new(dec!(42.50), "EUR");
        let negated = -&amount;
        assert_eq!(negated.number, dec!(-42.50));
        assert_eq!(negated.currency, "EUR");
        assert_eq!(-negated, amount);
    }

    #[test]
    fn test_display() {
        let amount = Amount::new(dec!(1234.56), "USD");
        assert_eq!(format!("{amount}"), "1234.56 USD");
    }
}
