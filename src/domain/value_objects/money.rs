//! # Money Helpers
//!
//! Currency codes and the rounding rules applied to every monetary amount.
//!
//! All amounts are [`Decimal`]; upstream JSON numbers are converted once at the
//! boundary with [`decimal_from_f64`] and rounded with [`round_money`].

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code, stored upper-case.
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::Currency;
///
/// assert_eq!(Currency::new("eur").unwrap().as_str(), "EUR");
/// assert_eq!(Currency::default().as_str(), "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Creates a validated currency code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCurrency` unless the value is three ASCII letters.
    pub fn new(code: impl AsRef<str>) -> DomainResult<Self> {
        let code = code.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// US dollars.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Parses a code, falling back to USD for anything invalid.
    #[must_use]
    pub fn or_usd(code: Option<&str>) -> Self {
        code.and_then(|c| Self::new(c).ok()).unwrap_or_default()
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Rounds to cents, half away from zero.
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an upstream float. Non-finite values become `None`.
#[must_use]
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Converts to `f64` for geometry and display; zero when out of range.
#[must_use]
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Percentage of an amount, rounded to cents.
#[must_use]
pub fn percent_of(amount: Decimal, percent: u32) -> Decimal {
    round_money(amount * Decimal::from(percent) / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_currency() {
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("U5D").is_err());
        assert_eq!(Currency::or_usd(Some("nope")).as_str(), "USD");
        assert_eq!(Currency::or_usd(Some("gbp")).as_str(), "GBP");
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
        assert_eq!(round_money(Decimal::new(-5, 3)), Decimal::new(-1, 2));
    }

    #[test]
    fn float_conversion() {
        assert!(decimal_from_f64(f64::NAN).is_none());
        assert!(decimal_from_f64(f64::INFINITY).is_none());
        assert_eq!(round_money(decimal_from_f64(12.5).unwrap()), Decimal::new(1250, 2));
    }

    #[test]
    fn percentages() {
        assert_eq!(percent_of(Decimal::from(1000), 15), Decimal::from(150));
        assert_eq!(percent_of(Decimal::new(3333, 2), 80), Decimal::new(2666, 2));
    }
}
