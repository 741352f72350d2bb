//! # Location Code
//!
//! Canonical UN/LOCODE-style token for a shipping origin or destination.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical location code such as `CNSHA` or `NLRTM`.
///
/// # Invariants
///
/// - 3 to 8 ASCII alphanumeric characters
/// - Stored upper-case
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::LocationCode;
///
/// let code = LocationCode::new("cnsha").unwrap();
/// assert_eq!(code.as_str(), "CNSHA");
/// assert!(LocationCode::new("CN SHA").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode(String);

impl LocationCode {
    /// Creates a validated location code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLocationCode` if the value is not 3-8
    /// alphanumeric characters.
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let value = value.as_ref().trim();
        let valid = (3..=8).contains(&value.len()) && value.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(DomainError::InvalidLocationCode(value.to_string()));
        }
        Ok(Self(value.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the two-letter country prefix.
    #[must_use]
    pub fn country(&self) -> &str {
        self.0.get(..2).unwrap_or(&self.0)
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocationCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LocationCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationCode> for String {
    fn from(code: LocationCode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case() {
        assert_eq!(LocationCode::new("nlrtm").unwrap().as_str(), "NLRTM");
    }

    #[test]
    fn rejects_invalid() {
        assert!(LocationCode::new("").is_err());
        assert!(LocationCode::new("AB").is_err());
        assert!(LocationCode::new("TOOLONGCODE").is_err());
        assert!(LocationCode::new("GB-LON").is_err());
    }

    #[test]
    fn country_prefix() {
        assert_eq!(LocationCode::new("GBFXT").unwrap().country(), "GB");
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<LocationCode, _> = serde_json::from_str("\"deham\"");
        assert_eq!(ok.unwrap().as_str(), "DEHAM");
        let bad: Result<LocationCode, _> = serde_json::from_str("\"??\"");
        assert!(bad.is_err());
    }
}
