//! # Audit Log Entry
//!
//! Append-only record of a business action. Never mutated or deleted.

use crate::domain::value_objects::{AuditEntryId, OrganizationId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action names written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// A booking was created.
    #[serde(rename = "booking.created")]
    BookingCreated,
    /// A booking was approved.
    #[serde(rename = "booking.approved")]
    BookingApproved,
    /// A booking was rejected.
    #[serde(rename = "booking.rejected")]
    BookingRejected,
    /// An operator overwrote a booking status.
    #[serde(rename = "booking.status_changed")]
    BookingStatusChanged,
    /// A payment was confirmed.
    #[serde(rename = "payment.received")]
    PaymentReceived,
    /// A transactional e-mail was queued for delivery.
    #[serde(rename = "email.sent")]
    EmailSent,
    /// A transactional e-mail could not be queued.
    #[serde(rename = "email.failed")]
    EmailFailed,
}

impl AuditAction {
    /// Dotted action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookingCreated => "booking.created",
            Self::BookingApproved => "booking.approved",
            Self::BookingRejected => "booking.rejected",
            Self::BookingStatusChanged => "booking.status_changed",
            Self::PaymentReceived => "payment.received",
            Self::EmailSent => "email.sent",
            Self::EmailFailed => "email.failed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    id: AuditEntryId,
    action: AuditAction,
    entity_type: String,
    entity_id: String,
    actor: String,
    organization: Option<OrganizationId>,
    details: serde_json::Value,
    timestamp: Timestamp,
}

impl AuditLogEntry {
    /// Creates an entry stamped now.
    ///
    /// `actor` is the acting subject, or `public` / `system` for
    /// unauthenticated and background actions.
    #[must_use]
    pub fn new(
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        actor: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: AuditEntryId::generate(),
            action,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            actor: actor.into(),
            organization: None,
            details,
            timestamp: Timestamp::now(),
        }
    }

    /// Attaches the organization context.
    #[must_use]
    pub fn with_organization(mut self, organization: Option<OrganizationId>) -> Self {
        self.organization = organization;
        self
    }

    /// Entry id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &AuditEntryId {
        &self.id
    }

    /// Action.
    #[inline]
    #[must_use]
    pub fn action(&self) -> AuditAction {
        self.action
    }

    /// Entity type (`booking`, `system`).
    #[inline]
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Entity id.
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Acting subject.
    #[inline]
    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Organization context.
    #[inline]
    #[must_use]
    pub fn organization(&self) -> Option<&OrganizationId> {
        self.organization.as_ref()
    }

    /// Free-form details.
    #[inline]
    #[must_use]
    pub fn details(&self) -> &serde_json::Value {
        &self.details
    }

    /// When the action happened.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
