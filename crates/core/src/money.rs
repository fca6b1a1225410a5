//! Money as a fixed-point decimal.
//!
//! Prices are snapshotted into order lines and multiplied by quantities, so they are kept
//! as `rust_decimal::Decimal` and never pass through floating point.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Fractional digits kept for every price.
pub const PRICE_SCALE: u32 = 2;

/// Non-negative unit price, rounded to cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Build a price, rejecting negative amounts.
    ///
    /// Amounts with more than two fractional digits are rounded half away from zero.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "price must not be negative (got {amount})"
            )));
        }
        Ok(Self(amount.round_dp_with_strategy(
            PRICE_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        )))
    }

    /// Build a price from an integer amount of cents.
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from(cents) / Decimal::ONE_HUNDRED)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// `price × quantity`, exact in decimal arithmetic.
    ///
    /// Returns `None` when the product does not fit a `Decimal`.
    pub fn checked_mul(&self, quantity: i64) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("invalid price '{s}': {e}")))?;
        Self::new(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_negative_amounts() {
        let err = Price::new(dec!(-0.01)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn accepts_zero() {
        assert_eq!(Price::new(dec!(0)).unwrap(), Price::ZERO);
    }

    #[test]
    fn rounds_to_cents_half_away_from_zero() {
        assert_eq!(Price::new(dec!(10.005)).unwrap().amount(), dec!(10.01));
        assert_eq!(Price::new(dec!(10.004)).unwrap().amount(), dec!(10.00));
    }

    #[test]
    fn from_cents_matches_decimal() {
        assert_eq!(Price::from_cents(1999).amount(), dec!(19.99));
    }

    #[test]
    fn multiplication_is_exact() {
        let price: Price = "0.10".parse().unwrap();
        assert_eq!(price.checked_mul(3), Some(dec!(0.30)));
    }

    #[test]
    fn displays_two_fraction_digits() {
        assert_eq!(Price::from_cents(1000).to_string(), "10.00");
    }

    #[test]
    fn serializes_as_string_and_validates_on_the_way_in() {
        let price: Price = "12.50".parse().unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"12.50\"");

        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);

        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every cent amount survives the round trip through text.
            #[test]
            fn cents_survive_text_round_trip(cents in 0u64..10_000_000_000) {
                let price = Price::from_cents(cents);
                let parsed: Price = price.to_string().parse().unwrap();
                prop_assert_eq!(parsed, price);
            }
        }
    }
}
