//! # In-Memory Repositories
//!
//! In-memory implementations for tests and single-node deployments without
//! a database.
//!
//! ## Available Repositories
//!
//! - [`InMemoryQuoteRepository`]: quote persistence
//! - [`InMemoryBookingRepository`]: booking persistence with version checks
//! - [`InMemoryAuditLogRepository`]: append-only audit trail
//! - [`InMemoryNotificationRepository`]: in-app notifications
//! - [`InMemoryPaymentAttemptRepository`]: invoice stubs
//! - [`InMemoryContractRateRepository`]: negotiated lane prices
//! - [`InMemoryAccountDirectory`]: roles and plan tiers
//!
//! ## Thread Safety
//!
//! Repositories use `Arc<tokio::sync::RwLock<..>>` for thread-safe access;
//! the account directory uses `parking_lot` since it never awaits.

pub mod account_directory;
pub mod audit_log_repository;
pub mod booking_repository;
pub mod contract_rate_repository;
pub mod notification_repository;
pub mod payment_attempt_repository;
pub mod quote_repository;

pub use account_directory::InMemoryAccountDirectory;
pub use audit_log_repository::InMemoryAuditLogRepository;
pub use booking_repository::InMemoryBookingRepository;
pub use contract_rate_repository::InMemoryContractRateRepository;
pub use notification_repository::InMemoryNotificationRepository;
pub use payment_attempt_repository::InMemoryPaymentAttemptRepository;
pub use quote_repository::InMemoryQuoteRepository;
