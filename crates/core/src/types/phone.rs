//! Phone number type.
//!
//! Registration collects a ten digit Indian mobile number and the platform
//! stores it with the `+91` country prefix.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Country prefix prepended to locally entered numbers.
pub const COUNTRY_PREFIX: &str = "+91";

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number must contain only digits")]
    NonDigit,
    #[error("phone number must be exactly {expected} digits (got {got})")]
    Length { expected: usize, got: usize },
}

/// A phone number in `+91XXXXXXXXXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of local digits.
    pub const LOCAL_DIGITS: usize = 10;

    /// Parse locally entered digits, tolerating spaces, dashes and an
    /// existing `+91` prefix.
    ///
    /// ```
    /// use skillcoders_core::PhoneNumber;
    ///
    /// let phone = PhoneNumber::parse_local("98765 43210").unwrap();
    /// assert_eq!(phone.as_str(), "+919876543210");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] for non-digit input or a wrong digit count.
    pub fn parse_local(input: &str) -> Result<Self, PhoneError> {
        let trimmed = input.trim();
        let local = trimmed.strip_prefix(COUNTRY_PREFIX).unwrap_or(trimmed);
        let digits: String = local
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }
        if digits.len() != Self::LOCAL_DIGITS {
            return Err(PhoneError::Length {
                expected: Self::LOCAL_DIGITS,
                got: digits.len(),
            });
        }

        Ok(Self(format!("{COUNTRY_PREFIX}{digits}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_added_once() {
        assert_eq!(
            PhoneNumber::parse_local("9876543210").unwrap().as_str(),
            "+919876543210"
        );
        assert_eq!(
            PhoneNumber::parse_local("+91 98765-43210").unwrap().as_str(),
            "+919876543210"
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            PhoneNumber::parse_local("98765x3210"),
            Err(PhoneError::NonDigit)
        );
        assert_eq!(
            PhoneNumber::parse_local("12345"),
            Err(PhoneError::Length {
                expected: 10,
                got: 5
            })
        );
        assert!(PhoneNumber::parse_local("").is_err());
    }
}
