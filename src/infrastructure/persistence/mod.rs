//! # Persistence Layer
//!
//! Repository ports and their in-memory implementations.
//!
//! ## Repository Traits (Ports)
//!
//! - [`QuoteRepository`], [`BookingRepository`]
//! - [`AuditLogRepository`], [`NotificationRepository`], [`PaymentAttemptRepository`]
//! - [`ContractRateRepository`], [`AccountDirectory`]
//!
//! ## Implementations
//!
//! - `in_memory`: lock-protected maps

pub mod in_memory;
pub mod traits;

pub use traits::{
    AccountDirectory, AuditFilter, AuditLogRepository, BookingRepository, ContractRateRepository,
    NotificationRepository, PaymentAttemptRepository, QuoteRepository, RepositoryError,
    RepositoryResult,
};
