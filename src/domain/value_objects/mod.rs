//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`QuoteId`], [`BookingId`]: generated `QT-`/`BK-` identifiers
//! - [`CarrierId`], [`ProviderId`]: rate source identifiers
//! - [`SubjectId`], [`OrganizationId`], [`GuestId`]: caller and owner identifiers
//! - [`Identity`], [`Owner`]: caller identity and record ownership
//!
//! ## Shipping
//!
//! - [`LocationCode`]: canonical port/city code
//! - [`Currency`] and the cent rounding helpers
//! - [`Timestamp`]: UTC instant
//!
//! ## Domain Enums
//!
//! - `ServiceType`: ocean, air, express, road
//! - `BookingStatus`: booking workflow states
//! - `Role`, `PlanTier`: account metadata

pub mod enums;
pub mod identity;
pub mod ids;
pub mod location;
pub mod money;
pub mod timestamp;

pub use enums::{
    BookingStatus, NotificationKind, NotificationPriority, ParseEnumError, PaymentStatus,
    PlanTier, QuoteStatus, Role, ServiceType,
};
pub use identity::{Identity, Owner};
pub use ids::{
    AuditEntryId, BookingId, CarrierId, GuestId, NotificationId, OrganizationId, ProviderId,
    QuoteId, SubjectId,
};
pub use location::LocationCode;
pub use money::{Currency, decimal_from_f64, decimal_to_f64, percent_of, round_money};
pub use timestamp::Timestamp;
