//! # Booking Workflow
//!
//! Turns one rate of a quote into a [`Booking`] and drives it through
//! approval and payment.
//!
//! ```text
//! create ──► pending ──approve──► approved ──confirm_payment──► confirmed
//!               │                                  ▲
//!               ├───────────confirm_payment────────┘
//!               └──reject──► rejected
//! ```
//!
//! Every customer-visible transition writes an audit entry and raises an
//! in-app notification. E-mails go through the [`Outbox`] and never block or
//! fail a transition. The payment-attempt stub written on creation may fail
//! without undoing the booking.
//!
//! Transitions are read-modify-write with optimistic locking: a concurrent
//! writer makes the slower transition fail with `Conflict`.
//!
//! # Examples
//!
//! ```ignore
//! let outcome = workflow.create_booking(&identity, command).await?;
//! for warning in &outcome.warnings {
//!     // surface "rate expired" to the caller
//! }
//! workflow.approve_booking(&admin, &outcome.booking_id, None).await?;
//! workflow.confirm_payment(&identity, &outcome.booking_id).await?;
//! ```

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::audit_trail::AuditTrail;
use crate::application::services::booking_emails;
use crate::application::services::notification_service::NotificationService;
use crate::domain::entities::{
    AdditionalFee, AuditAction, AuditLogEntry, Booking, BookingParty, ConfirmOutcome,
    Notification, PaymentAttempt, StopDetails,
};
use crate::domain::value_objects::{
    BookingId, BookingStatus, CarrierId, Identity, NotificationKind, NotificationPriority,
    OrganizationId, Owner, QuoteId, SubjectId, Timestamp,
};
use crate::infrastructure::notifications::{EmailMessage, Outbox, OutboxMessage, OutboxResult};
use crate::infrastructure::persistence::{
    AccountDirectory, AuditLogRepository, BookingRepository, NotificationRepository,
    PaymentAttemptRepository, QuoteRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Entity type written to audit entries.
const BOOKING_ENTITY: &str = "booking";

/// Link the UI follows from booking notifications.
const BOOKINGS_URL: &str = "/bookings";

/// Who may confirm a booking's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentConfirmationPolicy {
    /// The booking owner or an administrator.
    #[default]
    OwnerOrAdmin,
    /// The booking owner only.
    OwnerOnly,
    /// Administrators only.
    AdminOnly,
    /// Any signed-in caller; non-owners are logged.
    AnyAuthenticated,
}

impl PaymentConfirmationPolicy {
    /// Configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OwnerOrAdmin => "owner_or_admin",
            Self::OwnerOnly => "owner_only",
            Self::AdminOnly => "admin_only",
            Self::AnyAuthenticated => "any_authenticated",
        }
    }
}

impl fmt::Display for PaymentConfirmationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentConfirmationPolicy {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner_or_admin" => Ok(Self::OwnerOrAdmin),
            "owner_only" => Ok(Self::OwnerOnly),
            "admin_only" => Ok(Self::AdminOnly),
            "any_authenticated" => Ok(Self::AnyAuthenticated),
            other => Err(ApplicationError::validation(format!(
                "unknown payment confirmation policy: {other}"
            ))),
        }
    }
}

/// Workflow settings.
#[derive(Debug, Clone)]
pub struct BookingWorkflowConfig {
    /// Payment confirmation policy.
    pub payment_policy: PaymentConfirmationPolicy,
    /// Base URL of the customer dashboard, used in e-mail links.
    pub dashboard_url: String,
}

impl Default for BookingWorkflowConfig {
    fn default() -> Self {
        Self {
            payment_policy: PaymentConfirmationPolicy::default(),
            dashboard_url: "https://app.freightcode.co.uk".to_string(),
        }
    }
}

/// Stores the workflow reads and writes.
#[derive(Debug, Clone)]
pub struct BookingStores {
    /// Quotes, read only.
    pub quotes: Arc<dyn QuoteRepository>,
    /// Bookings.
    pub bookings: Arc<dyn BookingRepository>,
    /// Payment-attempt stubs, insert only.
    pub payments: Arc<dyn PaymentAttemptRepository>,
    /// Audit log.
    pub audit: Arc<dyn AuditLogRepository>,
    /// In-app notifications.
    pub notifications: Arc<dyn NotificationRepository>,
    /// Roles.
    pub accounts: Arc<dyn AccountDirectory>,
}

/// Input of [`BookingWorkflow::create_booking`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingCommand {
    /// Quote holding the selected rate.
    pub quote_id: QuoteId,
    /// Selected rate.
    pub carrier_id: CarrierId,
    /// Customer block.
    #[serde(default)]
    pub customer: BookingParty,
    /// Pickup block.
    #[serde(default)]
    pub pickup: StopDetails,
    /// Delivery block.
    #[serde(default)]
    pub delivery: StopDetails,
    /// Free-text instructions.
    #[serde(default)]
    pub special_instructions: Option<String>,
    /// Extra charges added to the price.
    #[serde(default)]
    pub additional_fees: Vec<AdditionalFee>,
}

/// Advisory condition attached to a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingWarning {
    /// The selected rate had expired; the booking was created anyway.
    RateExpired {
        /// End of the rate's validity.
        valid_until: Timestamp,
    },
}

/// Result of [`BookingWorkflow::create_booking`].
#[derive(Debug, Clone)]
pub struct CreateBookingOutcome {
    /// New booking id.
    pub booking_id: BookingId,
    /// Advisory conditions.
    pub warnings: Vec<BookingWarning>,
    /// The stored booking.
    pub booking: Booking,
}

/// Booking use cases.
#[derive(Debug)]
pub struct BookingWorkflow {
    quotes: Arc<dyn QuoteRepository>,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentAttemptRepository>,
    accounts: Arc<dyn AccountDirectory>,
    audit: AuditTrail,
    notifications: NotificationService,
    outbox: Arc<dyn Outbox>,
    config: BookingWorkflowConfig,
}

impl BookingWorkflow {
    /// Creates the workflow.
    #[must_use]
    pub fn new(stores: BookingStores, outbox: Arc<dyn Outbox>, config: BookingWorkflowConfig) -> Self {
        Self {
            audit: AuditTrail::new(stores.audit, Arc::clone(&stores.accounts)),
            notifications: NotificationService::new(stores.notifications),
            quotes: stores.quotes,
            bookings: stores.bookings,
            payments: stores.payments,
            accounts: stores.accounts,
            outbox,
            config,
        }
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &BookingWorkflowConfig {
        &self.config
    }

    /// Books one rate of a quote.
    ///
    /// An expired rate does not block the booking; it is reported as a
    /// [`BookingWarning::RateExpired`].
    ///
    /// # Errors
    ///
    /// - `QuoteNotFound` if the quote id is unknown
    /// - `RateNotFound` if the carrier id is not in the quote
    /// - `Repository` if the booking cannot be stored
    pub async fn create_booking(
        &self,
        identity: &Identity,
        command: CreateBookingCommand,
    ) -> ApplicationResult<CreateBookingOutcome> {
        let quote = self
            .quotes
            .get(&command.quote_id)
            .await?
            .ok_or_else(|| ApplicationError::QuoteNotFound(command.quote_id.to_string()))?;
        let rate = quote
            .find_rate(&command.carrier_id)
            .ok_or_else(|| ApplicationError::RateNotFound {
                quote_id: command.quote_id.to_string(),
                carrier_id: command.carrier_id.to_string(),
            })?;

        let mut warnings = Vec::new();
        if rate.is_expired() {
            tracing::warn!(
                quote_id = %quote.id(),
                carrier_id = %rate.carrier_id(),
                valid_until = %rate.valid_until(),
                "booking an expired rate"
            );
            warnings.push(BookingWarning::RateExpired {
                valid_until: rate.valid_until(),
            });
        }

        let owner = booking_owner(identity, quote.organization(), quote.owner());
        let booking = Booking::builder(quote.id().clone(), rate, owner)
            .customer(command.customer)
            .pickup(command.pickup)
            .delivery(command.delivery)
            .route(quote.request().origin(), quote.request().destination())
            .special_instructions(command.special_instructions)
            .additional_fees(command.additional_fees)
            .requested_by(identity.subject.clone())
            .build();

        self.bookings.insert(&booking).await?;
        tracing::info!(
            booking_id = %booking.id(),
            quote_id = %quote.id(),
            carrier_id = %booking.carrier_id(),
            amount = %booking.price().amount(),
            "booking created"
        );

        self.audit
            .record(
                self.audit_entry(
                    AuditAction::BookingCreated,
                    &booking,
                    identity.actor_label(),
                    json!({
                        "quoteId": quote.id(),
                        "carrierId": booking.carrier_id(),
                        "amount": booking.price().amount(),
                        "currency": booking.price().currency(),
                    }),
                ),
            )
            .await;

        let attempt = PaymentAttempt::pending_for(&booking);
        if let Err(e) = self.payments.insert(&attempt).await {
            tracing::warn!(booking_id = %booking.id(), error = %e, "payment attempt stub not stored");
        }

        if let Some(to) = booking_emails::recipient(&booking) {
            // Only review e-mails are audited; `send` logs a failed enqueue.
            let _ = self.send(booking_emails::received(&booking, to)).await;
        }

        if let Some(subject) = &identity.subject {
            self.notifications
                .notify(
                    Notification::new(
                        subject.clone(),
                        "Booking Created",
                        format!("Booking {} has been successfully submitted.", booking.id()),
                        NotificationKind::System,
                        NotificationPriority::Medium,
                    )
                    .with_action_url(BOOKINGS_URL),
                )
                .await;
        }

        Ok(CreateBookingOutcome {
            booking_id: booking.id().clone(),
            warnings,
            booking,
        })
    }

    /// Approves a pending booking. Administrators only.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Unauthorized` for guests and non-admins
    /// - `BookingNotFound` if the id is unknown
    /// - `InvalidState` unless the booking is pending
    /// - `Conflict` if another transition won the race
    pub async fn approve_booking(
        &self,
        actor: &Identity,
        id: &BookingId,
        notes: Option<String>,
    ) -> ApplicationResult<Booking> {
        let admin = self.require_admin(actor).await?;
        let mut booking = self.load(id).await?;
        let expected = booking.version();
        booking.approve(admin.clone(), notes)?;
        self.bookings.update(&booking, expected).await?;
        tracing::info!(booking_id = %id, approver = %admin, "booking approved");

        self.audit
            .record(self.audit_entry(
                AuditAction::BookingApproved,
                &booking,
                admin.to_string(),
                json!({ "notes": booking.notes() }),
            ))
            .await;

        if let Some(to) = booking_emails::recipient(&booking) {
            let queued = self.send(booking_emails::approved(&booking, to)).await;
            self.record_email(&booking, &admin, to, booking_emails::APPROVED_SUBJECT, queued)
                .await;
        }

        self.notify_requester(
            &booking,
            "Booking Approved",
            format!(
                "Your booking {} has been approved and is ready for processing.",
                booking.id()
            ),
            NotificationKind::Shipment,
            NotificationPriority::High,
        )
        .await;

        Ok(booking)
    }

    /// Rejects a pending booking with a reason. Administrators only.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Unauthorized` for guests and non-admins
    /// - `BookingNotFound` if the id is unknown
    /// - `Validation` for a blank reason
    /// - `InvalidState` unless the booking is pending
    /// - `Conflict` if another transition won the race
    pub async fn reject_booking(&self, actor: &Identity, id: &BookingId, reason: &str) -> ApplicationResult<Booking> {
        let admin = self.require_admin(actor).await?;
        let mut booking = self.load(id).await?;
        let expected = booking.version();
        booking.reject(admin.clone(), reason)?;
        self.bookings.update(&booking, expected).await?;
        let reason = booking.rejection_reason().unwrap_or_default().to_string();
        tracing::info!(booking_id = %id, reviewer = %admin, reason = %reason, "booking rejected");

        self.audit
            .record(self.audit_entry(
                AuditAction::BookingRejected,
                &booking,
                admin.to_string(),
                json!({ "reason": reason }),
            ))
            .await;

        if let Some(to) = booking_emails::recipient(&booking) {
            let queued = self.send(booking_emails::rejected(&booking, to, &reason)).await;
            self.record_email(&booking, &admin, to, booking_emails::REJECTED_SUBJECT, queued)
                .await;
        }

        self.notify_requester(
            &booking,
            "Booking Rejected",
            format!("Your booking {} was rejected: {reason}", booking.id()),
            NotificationKind::Shipment,
            NotificationPriority::High,
        )
        .await;

        Ok(booking)
    }

    /// Records a successful payment. Idempotent: confirming a confirmed
    /// booking changes nothing and writes nothing.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` for guests
    /// - `BookingNotFound` if the id is unknown
    /// - `Unauthorized` if the payment policy refuses the caller
    /// - `InvalidState` for rejected or operator-overwritten bookings
    /// - `Conflict` if another transition won the race
    pub async fn confirm_payment(&self, actor: &Identity, id: &BookingId) -> ApplicationResult<ConfirmOutcome> {
        let subject = actor.subject.as_ref().ok_or(ApplicationError::Unauthenticated)?;
        let mut booking = self.load(id).await?;
        self.authorize_payment(actor, subject, &booking).await?;

        let expected = booking.version();
        if booking.confirm_payment()? == ConfirmOutcome::AlreadyConfirmed {
            tracing::info!(booking_id = %id, "payment already confirmed");
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        if let Err(e) = self.bookings.update(&booking, expected).await {
            if e.is_version_conflict() {
                let current = self.load(id).await?;
                if current.status() == BookingStatus::Confirmed {
                    tracing::info!(booking_id = %id, "payment confirmed concurrently");
                    return Ok(ConfirmOutcome::AlreadyConfirmed);
                }
            }
            return Err(e.into());
        }

        let amount = booking.price().amount();
        let currency = booking.price().currency().clone();
        tracing::info!(booking_id = %id, %amount, %currency, "payment confirmed");

        self.audit
            .record(self.audit_entry(
                AuditAction::PaymentReceived,
                &booking,
                subject.to_string(),
                json!({
                    "amount": amount,
                    "currency": currency,
                    "method": "stripe_checkout",
                }),
            ))
            .await;

        if let Some(to) = booking_emails::recipient(&booking) {
            let _ = self
                .send(booking_emails::payment_received(&booking, to, &self.config.dashboard_url))
                .await;
        }

        self.notify_requester(
            &booking,
            "Payment Confirmed",
            format!(
                "We received your payment of {amount} {currency} for Booking {}.",
                booking.id()
            ),
            NotificationKind::Payment,
            NotificationPriority::Medium,
        )
        .await;

        Ok(ConfirmOutcome::Confirmed)
    }

    /// Operator overwrite of a booking's status, used for downstream states
    /// such as in-transit and delivered. Administrators only.
    ///
    /// Moving to `confirmed` also sends the confirmation e-mail.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Unauthorized` for guests and non-admins
    /// - `BookingNotFound` if the id is unknown
    /// - `Conflict` if another transition won the race
    pub async fn update_status(
        &self,
        actor: &Identity,
        id: &BookingId,
        status: BookingStatus,
        notes: Option<String>,
    ) -> ApplicationResult<Booking> {
        let admin = self.require_admin(actor).await?;
        let mut booking = self.load(id).await?;
        let expected = booking.version();
        let previous = booking.overwrite_status(status, notes);
        self.bookings.update(&booking, expected).await?;
        tracing::info!(booking_id = %id, from = %previous, to = %status, operator = %admin, "booking status overwritten");

        self.audit
            .record(self.audit_entry(
                AuditAction::BookingStatusChanged,
                &booking,
                admin.to_string(),
                json!({
                    "from": previous,
                    "to": status,
                    "notes": booking.notes(),
                }),
            ))
            .await;

        if status == BookingStatus::Confirmed && previous != BookingStatus::Confirmed {
            if let Some(to) = booking_emails::recipient(&booking) {
                let _ = self
                    .send(booking_emails::status_confirmed(&booking, to, &self.config.dashboard_url))
                    .await;
            }
        }

        self.notify_requester(
            &booking,
            "Booking Updated",
            format!("Booking {} is now {}.", booking.id(), status.as_str().replace('_', " ")),
            NotificationKind::Shipment,
            NotificationPriority::Medium,
        )
        .await;

        Ok(booking)
    }

    /// Fetches a booking visible to the caller: its owner, its requester or
    /// an administrator. Guest-owned bookings are readable by id.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the id is unknown
    /// - `Unauthorized` if the caller may not see it
    pub async fn get_booking(&self, identity: &Identity, id: &BookingId) -> ApplicationResult<Booking> {
        let booking = self.load(id).await?;
        if matches!(booking.owner(), Owner::Guest(_))
            || booking.owner().is_held_by(identity)
            || (identity.subject.is_some() && booking.requested_by() == identity.subject.as_ref())
        {
            return Ok(booking);
        }
        match &identity.subject {
            Some(subject) if self.accounts.role_of(subject).await?.is_admin() => Ok(booking),
            _ => Err(ApplicationError::unauthorized("booking belongs to another account")),
        }
    }

    /// Lists bookings, newest first: an organization's when `organization`
    /// is given (the caller must act for it), else the caller's personal
    /// bookings. Guests get an empty list.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when listing another organization
    /// - `Repository` on storage failure
    pub async fn list_bookings(
        &self,
        identity: &Identity,
        organization: Option<&OrganizationId>,
    ) -> ApplicationResult<Vec<Booking>> {
        if let Some(org) = organization {
            if identity.organization.as_ref() != Some(org) {
                return Err(ApplicationError::unauthorized(format!(
                    "not a member of organization {org}"
                )));
            }
            return Ok(self.bookings.find_by_organization(org).await?);
        }
        match &identity.subject {
            Some(subject) => Ok(self.bookings.find_personal(subject).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Pending bookings awaiting review, oldest first. Administrators only.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` / `Unauthorized` for guests and non-admins.
    pub async fn list_pending_approvals(&self, actor: &Identity) -> ApplicationResult<Vec<Booking>> {
        self.require_admin(actor).await?;
        Ok(self.bookings.find_by_status(BookingStatus::Pending).await?)
    }

    async fn load(&self, id: &BookingId) -> ApplicationResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::BookingNotFound(id.to_string()))
    }

    async fn require_admin(&self, actor: &Identity) -> ApplicationResult<SubjectId> {
        let subject = actor.subject.as_ref().ok_or(ApplicationError::Unauthenticated)?;
        let role = self.accounts.role_of(subject).await?;
        if !role.is_admin() {
            tracing::warn!(subject = %subject, %role, "admin action refused");
            return Err(ApplicationError::unauthorized("admin role required"));
        }
        Ok(subject.clone())
    }

    async fn authorize_payment(
        &self,
        actor: &Identity,
        subject: &SubjectId,
        booking: &Booking,
    ) -> ApplicationResult<()> {
        let is_owner = booking.owner().is_held_by(actor) || booking.requested_by() == Some(subject);
        let policy = self.config.payment_policy;
        let allowed = match policy {
            PaymentConfirmationPolicy::OwnerOnly => is_owner,
            PaymentConfirmationPolicy::OwnerOrAdmin => {
                is_owner || self.accounts.role_of(subject).await?.is_admin()
            }
            PaymentConfirmationPolicy::AdminOnly => self.accounts.role_of(subject).await?.is_admin(),
            PaymentConfirmationPolicy::AnyAuthenticated => {
                if !is_owner {
                    tracing::warn!(
                        booking_id = %booking.id(),
                        subject = %subject,
                        "payment confirmed by a non-owner"
                    );
                }
                true
            }
        };
        if allowed {
            Ok(())
        } else {
            tracing::warn!(booking_id = %booking.id(), subject = %subject, %policy, "payment confirmation refused");
            Err(ApplicationError::unauthorized(format!(
                "payment confirmation policy {policy} refuses this caller"
            )))
        }
    }

    fn audit_entry(
        &self,
        action: AuditAction,
        booking: &Booking,
        actor: String,
        details: serde_json::Value,
    ) -> AuditLogEntry {
        AuditLogEntry::new(action, BOOKING_ENTITY, booking.id().as_str(), actor, details)
            .with_organization(booking.owner().organization().cloned())
    }

    /// Audits the outcome of an enqueue: `email.sent` only when the outbox
    /// accepted the message.
    async fn record_email(
        &self,
        booking: &Booking,
        actor: &SubjectId,
        to: &str,
        subject: &str,
        queued: OutboxResult<()>,
    ) {
        let (action, details) = match queued {
            Ok(()) => (AuditAction::EmailSent, json!({ "to": to, "subject": subject })),
            Err(e) => (
                AuditAction::EmailFailed,
                json!({ "to": to, "subject": subject, "error": e.to_string() }),
            ),
        };
        self.audit
            .record(self.audit_entry(action, booking, actor.to_string(), details))
            .await;
    }

    /// Queues an e-mail. Failures are logged and returned, never raised.
    async fn send(&self, email: EmailMessage) -> OutboxResult<()> {
        let to = email.to.clone();
        let subject = email.subject.clone();
        let queued = self.outbox.enqueue(OutboxMessage::Email(email)).await;
        if let Err(e) = &queued {
            tracing::error!(to = %to, subject = %subject, error = %e, "email not queued");
        }
        queued
    }

    async fn notify_requester(
        &self,
        booking: &Booking,
        title: &str,
        message: String,
        kind: NotificationKind,
        priority: NotificationPriority,
    ) {
        let recipient = booking
            .requested_by()
            .or_else(|| booking.owner().subject())
            .cloned();
        match recipient {
            Some(recipient) => {
                self.notifications
                    .notify(
                        Notification::new(recipient, title, message, kind, priority)
                            .with_action_url(BOOKINGS_URL),
                    )
                    .await;
            }
            None => tracing::debug!(booking_id = %booking.id(), title, "no subject to notify"),
        }
    }
}

/// Owner of a new booking: the caller's organization, the quote's
/// organization, the caller, then the quote's guest owner.
fn booking_owner(identity: &Identity, quote_org: Option<&OrganizationId>, quote_owner: &Owner) -> Owner {
    if let Some(org) = identity.organization.as_ref().or(quote_org) {
        return Owner::Organization(org.clone());
    }
    match &identity.subject {
        Some(subject) => Owner::User(subject.clone()),
        None => quote_owner.clone(),
    }
}
