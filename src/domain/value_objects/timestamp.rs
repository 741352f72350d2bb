//! # Timestamp Value Object
//!
//! DateTime wrapper with domain-specific methods.
//!
//! This module provides the [`Timestamp`] type used for rate validity
//! windows, quote and booking creation times, and audit entries.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::value_objects::timestamp::Timestamp;
//!
//! let now = Timestamp::now();
//! let later = now.add_hours(24);
//!
//! assert!(later.is_after(&now));
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp.
///
/// Wraps `chrono::DateTime<Utc>` and serializes as an RFC 3339 string.
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::timestamp::Timestamp;
///
/// let in_one_day = Timestamp::now().add_days(1);
/// assert!(!in_one_day.is_expired());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use freight_quote::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_millis(1704067200000).unwrap();
    /// assert_eq!(ts.timestamp_millis(), 1704067200000);
    /// ```
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parses an upstream validity string.
    ///
    /// Accepts RFC 3339 (`2024-03-01T00:00:00Z`) and plain dates
    /// (`2024-03-01`, read as the end of that day in UTC).
    ///
    /// # Examples
    ///
    /// ```
    /// use freight_quote::domain::value_objects::timestamp::Timestamp;
    ///
    /// let a = Timestamp::parse_lenient("2024-01-01T00:00:00Z").unwrap();
    /// let b = Timestamp::parse_lenient("2024-01-01").unwrap();
    /// assert!(b.is_after(&a));
    /// assert!(Timestamp::parse_lenient("soon").is_none());
    /// ```
    #[must_use]
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
    }

    /// Returns the Unix timestamp in milliseconds.
    #[inline]
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Adds hours to the timestamp (can be negative).
    #[must_use]
    pub fn add_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// Adds days to the timestamp (can be negative).
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns true if this timestamp is in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Returns true if this timestamp is before another.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Returns true if both timestamps fall in the same UTC calendar month.
    #[must_use]
    pub fn same_month_as(&self, other: &Self) -> bool {
        self.0.year() == other.0.year() && self.0.month() == other.0.month()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.0 >= before);
        assert!(ts.0 <= after);
    }

    #[test]
    fn past_is_expired() {
        assert!(Timestamp::from_secs(0).unwrap().is_expired());
        assert!(!Timestamp::now().add_days(1).is_expired());
    }

    #[test]
    fn parse_lenient_plain_date_is_end_of_day() {
        let ts = Timestamp::parse_lenient("2024-05-10").unwrap();
        assert_eq!(ts.to_string(), "2024-05-10T23:59:59+00:00");
    }

    #[test]
    fn parse_lenient_rejects_garbage() {
        assert!(Timestamp::parse_lenient("").is_none());
        assert!(Timestamp::parse_lenient("10/05/2024").is_none());
    }

    #[test]
    fn same_month() {
        let a = Timestamp::parse_lenient("2024-05-01T00:00:00Z").unwrap();
        let b = Timestamp::parse_lenient("2024-05-31").unwrap();
        let c = Timestamp::parse_lenient("2024-06-01T00:00:00Z").unwrap();
        assert!(a.same_month_as(&b));
        assert!(!a.same_month_as(&c));
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::from_secs(1704067200).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }
}
