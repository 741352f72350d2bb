//! # Booking Aggregate
//!
//! A commitment to one selected carrier rate, carrying its own approval and
//! payment state machine.
//!
//! The booking owns an immutable price snapshot copied from the selected
//! rate; later changes to the quote never affect it. Every mutation goes
//! through a transition method that bumps `version` for optimistic locking.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::entities::booking::{Booking, BookingParty, ConfirmOutcome, StopDetails};
//! use freight_quote::domain::entities::carrier_rate::{CarrierRate, PriceBreakdown, RatePrice};
//! use freight_quote::domain::value_objects::*;
//! use rust_decimal::Decimal;
//!
//! let rate = CarrierRate::new(
//!     CarrierId::new("estimate-ocean"),
//!     "Estimated Rate",
//!     "ocean",
//!     "14-21 days",
//!     RatePrice::from_breakdown(PriceBreakdown::new(Decimal::from(900), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO), Currency::usd()),
//!     Timestamp::now().add_hours(24),
//! );
//! let mut booking = Booking::builder(QuoteId::new("QT-1"), &rate, Owner::User(SubjectId::new("u1")))
//!     .customer(BookingParty::default())
//!     .build();
//!
//! assert_eq!(booking.status(), BookingStatus::Pending);
//! booking.approve(SubjectId::new("admin"), None).unwrap();
//! assert_eq!(booking.confirm_payment().unwrap(), ConfirmOutcome::Confirmed);
//! assert_eq!(booking.confirm_payment().unwrap(), ConfirmOutcome::AlreadyConfirmed);
//! ```

use crate::domain::entities::carrier_rate::{CarrierRate, RatePrice};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    BookingId, BookingStatus, CarrierId, Owner, PaymentStatus, QuoteId, SubjectId, Timestamp,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer block of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingParty {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// E-mail address, used for transactional mail.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Company.
    #[serde(default)]
    pub company: String,
}

/// Pickup or delivery block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDetails {
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Requested date.
    #[serde(default)]
    pub date: String,
    /// Time window.
    #[serde(default)]
    pub time_window: String,
    /// On-site contact.
    #[serde(default)]
    pub contact_person: String,
    /// On-site phone.
    #[serde(default)]
    pub contact_phone: String,
}

/// Extra charge requested at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalFee {
    /// Description shown on the line item.
    pub description: String,
    /// Amount in the rate's currency.
    pub amount: Decimal,
}

/// Result of a payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The booking moved to confirmed.
    Confirmed,
    /// The booking was already confirmed; nothing changed.
    AlreadyConfirmed,
}

/// Booking aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    id: BookingId,
    quote_id: QuoteId,
    carrier_id: CarrierId,
    carrier_name: String,
    service_type: String,
    transit_time: String,
    route: Option<(String, String)>,
    customer: BookingParty,
    pickup: StopDetails,
    delivery: StopDetails,
    special_instructions: Option<String>,
    notes: Option<String>,
    price: RatePrice,
    rate_valid_until: Timestamp,
    status: BookingStatus,
    payment_status: PaymentStatus,
    reviewed_by: Option<SubjectId>,
    reviewed_at: Option<Timestamp>,
    rejection_reason: Option<String>,
    owner: Owner,
    requested_by: Option<SubjectId>,
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Booking {
    /// Starts a booking for `rate` from `quote_id`.
    #[must_use]
    pub fn builder(quote_id: QuoteId, rate: &CarrierRate, owner: Owner) -> BookingBuilder {
        BookingBuilder::new(quote_id, rate, owner)
    }

    fn transition_to(&mut self, target: BookingStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
        self.version = self.version.saturating_add(1);
    }

    /// Approves a pending booking.
    ///
    /// `notes` replaces the stored notes only when given.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the booking is pending.
    pub fn approve(&mut self, approver: SubjectId, notes: Option<String>) -> DomainResult<()> {
        self.transition_to(BookingStatus::Approved)?;
        self.reviewed_by = Some(approver);
        self.reviewed_at = Some(self.updated_at);
        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            self.notes = Some(notes);
        }
        Ok(())
    }

    /// Rejects a pending booking with a reason.
    ///
    /// # Errors
    ///
    /// - `MissingField("reason")` for a blank reason
    /// - `InvalidStateTransition` unless the booking is pending
    pub fn reject(&mut self, reviewer: SubjectId, reason: &str) -> DomainResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::MissingField("reason"));
        }
        self.transition_to(BookingStatus::Rejected)?;
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(self.updated_at);
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    /// Marks the booking paid and confirmed. Idempotent.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` when the booking is neither pending,
    /// approved nor already confirmed.
    pub fn confirm_payment(&mut self) -> DomainResult<ConfirmOutcome> {
        if self.status == BookingStatus::Confirmed {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }
        self.transition_to(BookingStatus::Confirmed)?;
        self.payment_status = PaymentStatus::Paid;
        Ok(ConfirmOutcome::Confirmed)
    }

    /// Operator overwrite of the status, bypassing the state machine.
    ///
    /// Returns the previous status.
    pub fn overwrite_status(&mut self, status: BookingStatus, notes: Option<String>) -> BookingStatus {
        let previous = self.status;
        self.status = status;
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        self.touch();
        previous
    }

    /// Booking id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &BookingId {
        &self.id
    }

    /// Source quote.
    #[inline]
    #[must_use]
    pub fn quote_id(&self) -> &QuoteId {
        &self.quote_id
    }

    /// Selected carrier rate id.
    #[inline]
    #[must_use]
    pub fn carrier_id(&self) -> &CarrierId {
        &self.carrier_id
    }

    /// Carrier name at booking time.
    #[inline]
    #[must_use]
    pub fn carrier_name(&self) -> &str {
        &self.carrier_name
    }

    /// Service description at booking time.
    #[inline]
    #[must_use]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Transit range at booking time.
    #[inline]
    #[must_use]
    pub fn transit_time(&self) -> &str {
        &self.transit_time
    }

    /// Free-text origin and destination of the quote.
    #[must_use]
    pub fn route(&self) -> Option<(&str, &str)> {
        self.route.as_ref().map(|(o, d)| (o.as_str(), d.as_str()))
    }

    /// Customer block.
    #[inline]
    #[must_use]
    pub fn customer(&self) -> &BookingParty {
        &self.customer
    }

    /// Pickup block.
    #[inline]
    #[must_use]
    pub fn pickup(&self) -> &StopDetails {
        &self.pickup
    }

    /// Delivery block.
    #[inline]
    #[must_use]
    pub fn delivery(&self) -> &StopDetails {
        &self.delivery
    }

    /// Special instructions.
    #[must_use]
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// Operator or approver notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Price snapshot.
    #[inline]
    #[must_use]
    pub fn price(&self) -> &RatePrice {
        &self.price
    }

    /// Validity of the selected rate when it was booked.
    #[inline]
    #[must_use]
    pub fn rate_valid_until(&self) -> Timestamp {
        self.rate_valid_until
    }

    /// Workflow state.
    #[inline]
    #[must_use]
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Payment state.
    #[inline]
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Administrator who approved or rejected.
    #[inline]
    #[must_use]
    pub fn reviewed_by(&self) -> Option<&SubjectId> {
        self.reviewed_by.as_ref()
    }

    /// When the review happened.
    #[inline]
    #[must_use]
    pub fn reviewed_at(&self) -> Option<Timestamp> {
        self.reviewed_at
    }

    /// Rejection reason.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Owner.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Subject that created the booking; receives in-app notifications.
    #[inline]
    #[must_use]
    pub fn requested_by(&self) -> Option<&SubjectId> {
        self.requested_by.as_ref()
    }

    /// Version for optimistic locking.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Creation time.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last mutation time.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

/// Builder for [`Booking`].
#[derive(Debug, Clone)]
#[must_use]
pub struct BookingBuilder {
    quote_id: QuoteId,
    rate: CarrierRate,
    owner: Owner,
    route: Option<(String, String)>,
    customer: BookingParty,
    pickup: StopDetails,
    delivery: StopDetails,
    special_instructions: Option<String>,
    additional_fees: Vec<AdditionalFee>,
    requested_by: Option<SubjectId>,
}

impl BookingBuilder {
    /// Creates a builder with the required fields.
    pub fn new(quote_id: QuoteId, rate: &CarrierRate, owner: Owner) -> Self {
        Self {
            quote_id,
            rate: rate.clone(),
            owner,
            route: None,
            customer: BookingParty::default(),
            pickup: StopDetails::default(),
            delivery: StopDetails::default(),
            special_instructions: None,
            additional_fees: Vec::new(),
            requested_by: None,
        }
    }

    /// Sets the customer block.
    pub fn customer(mut self, customer: BookingParty) -> Self {
        self.customer = customer;
        self
    }

    /// Sets the pickup block.
    pub fn pickup(mut self, pickup: StopDetails) -> Self {
        self.pickup = pickup;
        self
    }

    /// Sets the delivery block.
    pub fn delivery(mut self, delivery: StopDetails) -> Self {
        self.delivery = delivery;
        self
    }

    /// Sets the free-text route.
    pub fn route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.route = Some((origin.into(), destination.into()));
        self
    }

    /// Sets special instructions; blank text is ignored.
    pub fn special_instructions(mut self, text: Option<String>) -> Self {
        self.special_instructions = text.filter(|t| !t.trim().is_empty());
        self
    }

    /// Adds extra charges to the snapshot.
    pub fn additional_fees(mut self, fees: Vec<AdditionalFee>) -> Self {
        self.additional_fees = fees;
        self
    }

    /// Sets the requesting subject.
    pub fn requested_by(mut self, subject: Option<SubjectId>) -> Self {
        self.requested_by = subject;
        self
    }

    /// Builds a pending, unpaid booking with a fresh id.
    #[must_use]
    pub fn build(self) -> Booking {
        let now = Timestamp::now();
        let price = self.rate.price().clone().with_additional_fees(
            self.additional_fees
                .iter()
                .map(|fee| (fee.description.as_str(), fee.amount)),
        );
        Booking {
            id: BookingId::generate(),
            quote_id: self.quote_id,
            carrier_id: self.rate.carrier_id().clone(),
            carrier_name: self.rate.carrier_name().to_string(),
            service_type: self.rate.service_type().to_string(),
            transit_time: self.rate.transit_time().to_string(),
            route: self.route,
            customer: self.customer,
            pickup: self.pickup,
            delivery: self.delivery,
            special_instructions: self.special_instructions,
            notes: None,
            price,
            rate_valid_until: self.rate.valid_until(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            owner: self.owner,
            requested_by: self.requested_by,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}
