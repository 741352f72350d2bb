//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! Quotes, bookings and their side-effect records are reached only through
//! these traits, so the workflow never depends on a concrete store.
//!
//! # Available Repositories
//!
//! - [`QuoteRepository`]: aggregated quotes
//! - [`BookingRepository`]: bookings, with optimistic locking
//! - [`AuditLogRepository`]: append-only audit trail
//! - [`NotificationRepository`]: in-app notifications
//! - [`PaymentAttemptRepository`]: insert-only invoice stubs
//! - [`ContractRateRepository`]: negotiated lane prices
//! - [`AccountDirectory`]: roles and plan tiers of the identity provider
//!
//! # Examples
//!
//! ```ignore
//! use freight_quote::infrastructure::persistence::traits::BookingRepository;
//!
//! async fn approve(repo: &impl BookingRepository, id: &BookingId, approver: SubjectId) {
//!     let mut booking = repo.get(id).await?.unwrap();
//!     let expected = booking.version();
//!     booking.approve(approver, None)?;
//!     repo.update(&booking, expected).await?;
//! }
//! ```

use crate::domain::entities::{
    AuditAction, AuditLogEntry, Booking, ContractRate, Notification, PaymentAttempt, Quote,
};
use crate::domain::value_objects::{
    BookingId, BookingStatus, LocationCode, NotificationId, OrganizationId, Owner, PlanTier,
    QuoteId, Role, SubjectId, Timestamp,
};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Optimistic locking conflict.
    #[error("Version conflict: {entity_type} with id {id} has been modified")]
    VersionConflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
        /// Expected version.
        expected: u64,
        /// Actual version.
        actual: u64,
    },

    /// Store unavailable.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a version conflict error.
    #[must_use]
    pub fn version_conflict(
        entity_type: &'static str,
        id: impl Into<String>,
        expected: u64,
        actual: u64,
    ) -> Self {
        Self::VersionConflict {
            entity_type,
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository for aggregated quotes.
///
/// Quotes are immutable: there is no update.
#[async_trait]
pub trait QuoteRepository: Send + Sync + fmt::Debug {
    /// Stores a new quote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the id is taken.
    async fn insert(&self, quote: &Quote) -> RepositoryResult<()>;

    /// Gets a quote by id.
    async fn get(&self, id: &QuoteId) -> RepositoryResult<Option<Quote>>;

    /// Quotes owned by an organization, newest first.
    async fn find_by_organization(&self, organization: &OrganizationId) -> RepositoryResult<Vec<Quote>>;

    /// Quotes a user owns personally, newest first.
    async fn find_personal(&self, subject: &SubjectId) -> RepositoryResult<Vec<Quote>>;

    /// Number of quotes `owner` created in the calendar month containing `at`.
    ///
    /// Quota checks read this count and insert afterwards without holding a
    /// lock, so concurrent requests from one owner can each pass the check
    /// and overshoot the monthly limit by the number of requests in flight.
    /// An implementation that must enforce a hard limit has to reserve the
    /// slot atomically with the insert.
    async fn count_in_month(&self, owner: &Owner, at: Timestamp) -> RepositoryResult<u64>;
}

/// Repository for bookings.
///
/// Bookings are never deleted.
#[async_trait]
pub trait BookingRepository: Send + Sync + fmt::Debug {
    /// Stores a new booking.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the id is taken.
    async fn insert(&self, booking: &Booking) -> RepositoryResult<()>;

    /// Gets a booking by id.
    async fn get(&self, id: &BookingId) -> RepositoryResult<Option<Booking>>;

    /// Replaces a booking if its stored version still equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the booking does not exist
    /// - `RepositoryError::VersionConflict` if another write got there first
    async fn update(&self, booking: &Booking, expected_version: u64) -> RepositoryResult<()>;

    /// Bookings owned by an organization, newest first.
    async fn find_by_organization(&self, organization: &OrganizationId) -> RepositoryResult<Vec<Booking>>;

    /// Bookings a user owns personally, newest first.
    async fn find_personal(&self, subject: &SubjectId) -> RepositoryResult<Vec<Booking>>;

    /// Bookings in a given status, oldest first.
    async fn find_by_status(&self, status: BookingStatus) -> RepositoryResult<Vec<Booking>>;
}

/// Filter for audit queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Only entries for this entity type.
    pub entity_type: Option<String>,
    /// Only entries with this action.
    pub action: Option<AuditAction>,
    /// Maximum number of entries.
    pub limit: Option<usize>,
}

/// Append-only audit log.
#[async_trait]
pub trait AuditLogRepository: Send + Sync + fmt::Debug {
    /// Appends an entry.
    async fn append(&self, entry: &AuditLogEntry) -> RepositoryResult<()>;

    /// Entries matching `filter`, newest first.
    async fn list(&self, filter: &AuditFilter) -> RepositoryResult<Vec<AuditLogEntry>>;

    /// Every entry for one entity, oldest first.
    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> RepositoryResult<Vec<AuditLogEntry>>;
}

/// Repository for in-app notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync + fmt::Debug {
    /// Stores a notification.
    async fn insert(&self, notification: &Notification) -> RepositoryResult<()>;

    /// Gets a notification by id.
    async fn get(&self, id: &NotificationId) -> RepositoryResult<Option<Notification>>;

    /// Replaces a stored notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist.
    async fn update(&self, notification: &Notification) -> RepositoryResult<()>;

    /// Notifications for a subject, newest first, at most `limit`.
    async fn find_by_recipient(&self, recipient: &SubjectId, limit: usize) -> RepositoryResult<Vec<Notification>>;

    /// Unread notifications for a subject.
    async fn count_unread(&self, recipient: &SubjectId) -> RepositoryResult<u64>;

    /// Marks every notification of a subject read; returns how many changed.
    async fn mark_all_read(&self, recipient: &SubjectId) -> RepositoryResult<u64>;
}

/// Insert-only store of payment attempt stubs.
#[async_trait]
pub trait PaymentAttemptRepository: Send + Sync + fmt::Debug {
    /// Stores a stub.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the payment id is taken.
    async fn insert(&self, attempt: &PaymentAttempt) -> RepositoryResult<()>;
}

/// Repository for negotiated contract rates.
#[async_trait]
pub trait ContractRateRepository: Send + Sync + fmt::Debug {
    /// Stores or replaces a contract.
    async fn save(&self, contract: &ContractRate) -> RepositoryResult<()>;

    /// Contracts for a lane, regardless of validity.
    async fn find_by_lane(
        &self,
        origin: &LocationCode,
        destination: &LocationCode,
    ) -> RepositoryResult<Vec<ContractRate>>;
}

/// Read access to the identity provider's account data.
#[async_trait]
pub trait AccountDirectory: Send + Sync + fmt::Debug {
    /// Role of a subject; unknown subjects are members.
    async fn role_of(&self, subject: &SubjectId) -> RepositoryResult<Role>;

    /// Plan tier of an owner; unknown owners are on the free tier.
    async fn plan_of(&self, owner: &Owner) -> RepositoryResult<PlanTier>;
}
