//! # Application Services
//!
//! Use cases that orchestrate the domain and the infrastructure ports.
//!
//! - [`RateAggregator`]: concurrent fan-out to rate providers
//! - [`RateNormalizer`]: provider records to canonical [`CarrierRate`]s
//! - [`QuoteService`]: quote creation, plan limits and listing
//! - [`BookingWorkflow`]: booking creation, approval and payment
//! - [`NotificationService`], [`AuditTrail`]: workflow side effects
//!
//! [`CarrierRate`]: crate::domain::entities::CarrierRate

pub mod audit_trail;
pub(crate) mod booking_emails;
pub mod booking_workflow;
pub mod normalization;
pub mod notification_service;
pub mod quote_service;
pub mod rate_aggregation;

pub use audit_trail::AuditTrail;
pub use booking_workflow::{
    BookingStores, BookingWarning, BookingWorkflow, BookingWorkflowConfig, CreateBookingCommand,
    CreateBookingOutcome, PaymentConfirmationPolicy,
};
pub use normalization::{DEFAULT_ESTIMATE_VALIDITY_HOURS, RateNormalizer};
pub use notification_service::{DEFAULT_INBOX_LIMIT, NotificationService};
pub use quote_service::{DEFAULT_FREE_MONTHLY_QUOTES, QuoteService};
pub use rate_aggregation::{
    AggregatedRates, AggregationConfig, AggregationError, AggregationResult, ProviderFailure,
    RateAggregator, sort_by_price,
};
