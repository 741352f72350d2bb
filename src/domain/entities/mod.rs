//! # Domain Entities
//!
//! Aggregate roots and entities representing core business concepts.
//!
//! ## Aggregates
//!
//! - [`Quote`]: persisted request plus normalized rates
//! - [`Booking`]: selected rate with approval/payment state machine
//!
//! ## Entities
//!
//! - [`RateRequest`]: customer shipment request
//! - [`CarrierRate`]: canonical rate record
//! - [`AuditLogEntry`], [`Notification`], [`PaymentAttempt`]: workflow side effects
//! - [`ContractRate`]: negotiated lane price

pub mod audit;
pub mod booking;
pub mod carrier_rate;
pub mod contract_rate;
pub mod notification;
pub mod payment_attempt;
pub mod quote;
pub mod rate_request;

pub use audit::{AuditAction, AuditLogEntry};
pub use booking::{
    AdditionalFee, Booking, BookingBuilder, BookingParty, ConfirmOutcome, StopDetails,
};
pub use carrier_rate::{CarrierRate, LineItem, LineItemCategory, PriceBreakdown, RatePrice};
pub use contract_rate::ContractRate;
pub use notification::Notification;
pub use payment_attempt::{PaymentAttempt, PaymentAttemptStatus, Payer, PaymentTotals};
pub use quote::{LaneCodes, Quote};
pub use rate_request::{ContactInfo, Dimensions, RateRequest, RateRequestBuilder};
