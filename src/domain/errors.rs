//! # Domain Errors
//!
//! Errors raised by value validation and the booking state machine.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::errors::DomainError;
//! use freight_quote::domain::value_objects::BookingStatus;
//!
//! let err = DomainError::InvalidStateTransition {
//!     from: BookingStatus::Rejected,
//!     to: BookingStatus::Approved,
//! };
//! assert!(err.to_string().contains("rejected"));
//! ```

use crate::domain::value_objects::enums::BookingStatus;
use thiserror::Error;

/// Domain rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Location code is malformed.
    #[error("invalid location code: {0}")]
    InvalidLocationCode(String),

    /// Currency code is malformed.
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),

    /// Booking cannot move between these states.
    #[error("invalid booking transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: BookingStatus,
        /// Requested state.
        to: BookingStatus,
    },

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A value failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
