//! Course prices.
//!
//! Prices travel as rupee amounts. The checkout widget wants the amount in
//! paise, and listings show it with the rupee sign.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is not a number")]
    NotANumber,
    #[error("price cannot be negative")]
    Negative,
}

/// A rupee amount.
///
/// Accepts JSON numbers or numeric strings and serializes as a JSON number,
/// which is what the platform API sends and expects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse an admin-entered price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] when the input is not a non-negative decimal.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let amount: Decimal = input.trim().parse().map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount in paise, rounded to the nearest paisa.
    #[must_use]
    pub fn paise(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(0)
    }

    /// Display form with trailing zeros dropped, e.g. `₹499` or `₹499.5`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("₹{}", self.0.normalize())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl<'a> core::iter::Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
