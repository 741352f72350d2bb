//! # Rate Provider Errors
//!
//! Error types for rate provider adapters.
//!
//! Each adapter reports failures with [`ProviderError`]. The aggregator logs
//! and absorbs them; they never reach the caller of a quote request.
//!
//! # Examples
//!
//! ```
//! use freight_quote::infrastructure::rates::error::ProviderError;
//!
//! let error = ProviderError::timeout("token endpoint did not answer");
//! assert!(error.is_retryable());
//!
//! let error = ProviderError::no_rate_for_lane("no sailing CNSHA-GBFXT");
//! assert!(error.is_business());
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Error type for one rate provider call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Credentials rejected or token exchange failed.
    #[error("provider authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Upstream rate limit.
    #[error("provider rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
        /// Retry after duration in milliseconds.
        retry_after_ms: Option<u64>,
    },

    /// Upstream refused the request parameters.
    #[error("provider invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Response did not match the expected shape.
    #[error("provider schema error: {message}")]
    Schema {
        /// Error message.
        message: String,
    },

    /// The provider has no price for this lane.
    #[error("no rate for lane: {message}")]
    NoRateForLane {
        /// Error message.
        message: String,
    },

    /// The provider does not serve the requested transport mode.
    #[error("unsupported mode: {mode}")]
    UnsupportedMode {
        /// Requested mode.
        mode: String,
    },

    /// Adapter-side failure.
    #[error("provider internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_ms,
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates a no-rate-for-lane error.
    #[must_use]
    pub fn no_rate_for_lane(message: impl Into<String>) -> Self {
        Self::NoRateForLane {
            message: message.into(),
        }
    }

    /// Creates an unsupported mode error.
    #[must_use]
    pub fn unsupported_mode(mode: impl Into<String>) -> Self {
        Self::UnsupportedMode { mode: mode.into() }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and may succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::RateLimited { .. }
        )
    }

    /// Returns true for business outcomes rather than faults.
    #[must_use]
    pub fn is_business(&self) -> bool {
        matches!(self, Self::NoRateForLane { .. } | Self::UnsupportedMode { .. })
    }

    /// Short stable label for logs and failure summaries.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::Authentication { .. } => "authentication",
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Schema { .. } => "schema",
            Self::NoRateForLane { .. } => "no_rate_for_lane",
            Self::UnsupportedMode { .. } => "unsupported_mode",
            Self::Internal { .. } => "internal",
        }
    }

    /// Returns the retry delay in milliseconds, if applicable.
    #[must_use]
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }
}

/// Result type for rate provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ProviderError::timeout("t").is_retryable());
        assert!(ProviderError::connection("c").is_retryable());
        assert!(ProviderError::rate_limited("r", Some(500)).is_retryable());
    }

    #[test]
    fn authentication_is_not_retryable() {
        let error = ProviderError::authentication("bad key");
        assert!(!error.is_retryable());
        assert!(!error.is_business());
        assert_eq!(error.kind(), "authentication");
    }

    #[test]
    fn business_outcomes() {
        assert!(ProviderError::unsupported_mode("road").is_business());
        assert!(!ProviderError::schema("x").is_business());
    }

    #[test]
    fn retry_after() {
        assert_eq!(ProviderError::rate_limited("r", Some(1000)).retry_after_ms(), Some(1000));
        assert_eq!(ProviderError::timeout("t").retry_after_ms(), None);
    }

    #[test]
    fn display_format() {
        let display = ProviderError::timeout_with_duration("quote call", 5000).to_string();
        assert!(display.contains("timeout"));
        assert!(display.contains("quote call"));
    }
}
