//! # Application Errors
//!
//! Error types for the application layer.
//!
//! Provider failures never reach this layer: the aggregator absorbs them.
//! What remains are reference errors, authorization failures, quota
//! violations and infrastructure faults.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── LocationNotFound            - origin/destination cannot be resolved
//! ├── QuoteNotFound / RateNotFound / BookingNotFound / NotFound
//! ├── Unauthenticated / Unauthorized
//! ├── PlanLimitReached            - monthly quota exhausted
//! ├── RateFetchFailed             - not even the estimate was produced
//! ├── InvalidState / Conflict     - state machine and concurrent writes
//! ├── Validation(String)
//! ├── Domain(DomainError)
//! ├── Repository(RepositoryError)
//! └── Internal(String)
//! ```
//!
//! # Examples
//!
//! ```
//! use freight_quote::application::error::ApplicationError;
//! use freight_quote::domain::value_objects::PlanTier;
//!
//! let err = ApplicationError::PlanLimitReached { limit: 5, tier: PlanTier::Free };
//! assert_eq!(err.code(), "plan_limit_reached");
//! assert!(err.user_message().contains("upgrade"));
//! ```

use crate::application::services::rate_aggregation::AggregationError;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::PlanTier;
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Origin or destination could not be resolved to a location code.
    #[error("location not found: {origin} -> {destination}")]
    LocationNotFound {
        /// Origin as given.
        origin: String,
        /// Destination as given.
        destination: String,
    },

    /// Quote id is unknown.
    #[error("quote not found: {0}")]
    QuoteNotFound(String),

    /// Carrier id is not among the quote's rates.
    #[error("rate {carrier_id} not found in quote {quote_id}")]
    RateNotFound {
        /// Quote searched.
        quote_id: String,
        /// Carrier id requested.
        carrier_id: String,
    },

    /// Booking id is unknown.
    #[error("booking not found: {0}")]
    BookingNotFound(String),

    /// Any other resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Caller is a guest but the operation needs a subject.
    #[error("authentication required")]
    Unauthenticated,

    /// Caller lacks the required role or ownership.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Monthly quote quota exhausted.
    #[error("plan limit reached: {limit} quotes per month on the {tier} plan")]
    PlanLimitReached {
        /// Monthly limit.
        limit: u32,
        /// Owner's tier.
        tier: PlanTier,
    },

    /// No rate at all could be produced.
    #[error("rate fetch failed: {0}")]
    RateFetchFailed(String),

    /// Operation not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Concurrent modification detected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Domain rule violated.
    #[error("domain error: {0}")]
    Domain(DomainError),

    /// Storage failure.
    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::LocationNotFound { .. } => "location_not_found",
            Self::QuoteNotFound(_) => "quote_not_found",
            Self::RateNotFound { .. } => "rate_not_found",
            Self::BookingNotFound(_) => "booking_not_found",
            Self::NotFound { .. } => "not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::Unauthorized(_) => "unauthorized",
            Self::PlanLimitReached { .. } => "plan_limit_reached",
            Self::RateFetchFailed(_) => "rate_fetch_failed",
            Self::InvalidState(_) => "invalid_state",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_error",
            Self::Domain(_) => "domain_error",
            Self::Repository(_) => "repository_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message suitable for end users, with remediation where there is one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationNotFound { origin, destination } => format!(
                "Could not find a location code for route {origin} -> {destination}. \
                 Please use major ports (e.g. Shanghai, Los Angeles, Rotterdam)."
            ),
            Self::PlanLimitReached { limit, .. } => format!(
                "You have reached your monthly limit of {limit} quotes. \
                 Please upgrade to Pro for unlimited quotes."
            ),
            Self::RateFetchFailed(_) => {
                "No rates could be retrieved for this route. Please try again later.".to_string()
            }
            Self::Unauthenticated => "Please sign in to continue.".to_string(),
            Self::Unauthorized(_) => "You are not allowed to perform this action.".to_string(),
            Self::Conflict(_) => {
                "This record was changed by someone else. Reload and try again.".to_string()
            }
            Self::Repository(_) | Self::Internal(_) => {
                "Something went wrong on our side. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::QuoteNotFound(_)
                | Self::RateNotFound { .. }
                | Self::BookingNotFound(_)
                | Self::NotFound { .. }
        )
    }

    /// Returns true if this is an authentication or authorization error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Unauthenticated)
    }
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidStateTransition { .. } => Self::InvalidState(error.to_string()),
            DomainError::MissingField(_) | DomainError::Validation(_) => {
                Self::Validation(error.to_string())
            }
            other => Self::Domain(other),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        if error.is_version_conflict() {
            return Self::Conflict(error.to_string());
        }
        Self::Repository(error)
    }
}

impl From<AggregationError> for ApplicationError {
    fn from(error: AggregationError) -> Self {
        match error {
            AggregationError::LocationNotFound {
                origin,
                destination,
            } => Self::LocationNotFound {
                origin,
                destination,
            },
            other => Self::RateFetchFailed(other.to_string()),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::BookingStatus;

    #[test]
    fn location_not_found_gives_guidance() {
        let err = ApplicationError::LocationNotFound {
            origin: "Atlantis".to_string(),
            destination: "Rotterdam".to_string(),
        };
        assert!(err.user_message().contains("major ports"));
        assert_eq!(err.code(), "location_not_found");
    }

    #[test]
    fn invalid_transition_maps_to_invalid_state() {
        let err: ApplicationError = DomainError::InvalidStateTransition {
            from: BookingStatus::Rejected,
            to: BookingStatus::Approved,
        }
        .into();
        assert!(matches!(err, ApplicationError::InvalidState(_)));
    }

    #[test]
    fn missing_field_maps_to_validation() {
        let err: ApplicationError = DomainError::MissingField("reason").into();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn version_conflict_maps_to_conflict() {
        let err: ApplicationError =
            RepositoryError::version_conflict("Booking", "BK-1", 1, 2).into();
        assert!(matches!(err, ApplicationError::Conflict(_)));
    }

    #[test]
    fn other_repository_errors_are_wrapped() {
        let err: ApplicationError = RepositoryError::internal("disk").into();
        assert_eq!(err.code(), "repository_error");
        assert!(!err.user_message().contains("disk"));
    }

    #[test]
    fn aggregation_errors_map() {
        let err: ApplicationError = AggregationError::LocationNotFound {
            origin: "a".to_string(),
            destination: "b".to_string(),
        }
        .into();
        assert!(matches!(err, ApplicationError::LocationNotFound { .. }));

        let err: ApplicationError = AggregationError::Timeout.into();
        assert_eq!(err.code(), "rate_fetch_failed");
    }

    #[test]
    fn not_found_variants() {
        assert!(ApplicationError::QuoteNotFound("QT-1".to_string()).is_not_found());
        assert!(ApplicationError::BookingNotFound("BK-1".to_string()).is_not_found());
        assert!(ApplicationError::not_found("Notification", "n1").is_not_found());
        assert!(!ApplicationError::validation("x").is_not_found());
    }

    #[test]
    fn unauthorized_variants() {
        assert!(ApplicationError::Unauthenticated.is_unauthorized());
        assert!(ApplicationError::unauthorized("admin only").is_unauthorized());
    }
}
