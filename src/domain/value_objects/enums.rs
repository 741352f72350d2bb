//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! - [`ServiceType`] - Transport mode requested or quoted
//! - [`QuoteStatus`] - Outcome of a quote attempt
//! - [`BookingStatus`] - Booking workflow state
//! - [`PaymentStatus`] - Payment state of a booking
//! - [`Role`] - Account role used for admin-only capabilities
//! - [`PlanTier`] - Subscription tier used for quote quotas
//! - [`NotificationKind`] / [`NotificationPriority`] - In-app notification metadata
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// The value does not name any variant.
    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
}

/// Transport mode.
///
/// Parsing is forgiving: `sea`, `fcl` and `lcl` read as [`ServiceType::Ocean`],
/// `truck` as [`ServiceType::Road`].
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::enums::ServiceType;
///
/// assert_eq!("sea".parse::<ServiceType>().unwrap(), ServiceType::Ocean);
/// assert_eq!(ServiceType::Air.to_string(), "air");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Ocean freight (FCL/LCL).
    #[serde(alias = "sea", alias = "fcl", alias = "lcl")]
    Ocean,
    /// Standard air freight.
    Air,
    /// Express / courier air.
    Express,
    /// Road haulage.
    #[serde(alias = "truck")]
    Road,
}

impl ServiceType {
    /// Returns true for modes carried by aircraft.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air | Self::Express)
    }

    /// Returns the lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Air => "air",
            Self::Express => "express",
            Self::Road => "road",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ocean" | "sea" | "fcl" | "lcl" => Ok(Self::Ocean),
            "air" => Ok(Self::Air),
            "express" => Ok(Self::Express),
            "road" | "truck" => Ok(Self::Road),
            _ => Err(ParseEnumError::InvalidValue("ServiceType", s.to_string())),
        }
    }
}

/// Outcome of a quote attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// At least one rate was produced.
    Success,
    /// No rate source succeeded.
    Failed,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Booking workflow state.
///
/// ```text
/// Pending ──► Approved ──► Confirmed
///    │                        ▲
///    ├────────────────────────┘
///    └──► Rejected
/// ```
///
/// `InTransit`, `Delivered` and `Cancelled` are reached only through the
/// operator status overwrite.
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::enums::BookingStatus;
///
/// assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Approved));
/// assert!(BookingStatus::Approved.can_transition_to(BookingStatus::Confirmed));
/// assert!(!BookingStatus::Rejected.can_transition_to(BookingStatus::Approved));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting admin review.
    Pending,
    /// Approved by an administrator.
    Approved,
    /// Rejected by an administrator.
    Rejected,
    /// Paid and confirmed.
    Confirmed,
    /// Cargo moving.
    InTransit,
    /// Cargo delivered.
    Delivered,
    /// Cancelled, kept as record.
    Cancelled,
}

impl BookingStatus {
    /// Returns true if the workflow allows moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Confirmed)
                | (Self::Approved, Self::Confirmed)
        )
    }

    /// Returns true for states the approval workflow never leaves.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Confirmed)
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Confirmed => "confirmed",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "confirmed" => Ok(Self::Confirmed),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError::InvalidValue("BookingStatus", s.to_string())),
        }
    }
}

/// Payment state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not yet paid.
    Unpaid,
    /// Paid.
    Paid,
    /// Refunded.
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular member.
    #[default]
    Member,
    /// Organization or platform administrator.
    Admin,
    /// Platform operator.
    PlatformSuperadmin,
}

impl Role {
    /// Returns true if the role may approve, reject and audit.
    #[inline]
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::PlatformSuperadmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => write!(f, "member"),
            Self::Admin => write!(f, "admin"),
            Self::PlatformSuperadmin => write!(f, "platform_superadmin"),
        }
    }
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier, monthly quote quota.
    #[default]
    Free,
    /// Paid tier.
    Pro,
    /// Contracted tier.
    Enterprise,
}

impl PlanTier {
    /// Returns true if the tier has a monthly quote quota.
    #[inline]
    #[must_use]
    pub const fn is_metered(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

/// Category of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Shipment and booking progress.
    Shipment,
    /// Payment events.
    Payment,
    /// Documents.
    Document,
    /// System messages.
    System,
}

/// Priority of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Default.
    Medium,
    /// Needs attention.
    High,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn service_type_aliases() {
        assert_eq!("FCL".parse::<ServiceType>().unwrap(), ServiceType::Ocean);
        assert_eq!("truck".parse::<ServiceType>().unwrap(), ServiceType::Road);
        assert!("rail".parse::<ServiceType>().is_err());
        let parsed: ServiceType = serde_json::from_str("\"sea\"").unwrap();
        assert_eq!(parsed, ServiceType::Ocean);
    }

    #[test]
    fn booking_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Confirmed));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Confirmed.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Confirmed));
        assert!(Rejected.is_terminal());
        assert!(!Approved.is_terminal());
    }

    #[test]
    fn booking_status_wire_names() {
        assert_eq!(BookingStatus::InTransit.to_string(), "in_transit");
        assert_eq!(
            "in_transit".parse::<BookingStatus>().unwrap(),
            BookingStatus::InTransit
        );
        assert_eq!(
            serde_json::to_string(&BookingStatus::InTransit).unwrap(),
            "\"in_transit\""
        );
    }

    #[test]
    fn admin_roles() {
        assert!(Role::Admin.is_admin());
        assert!(Role::PlatformSuperadmin.is_admin());
        assert!(!Role::Member.is_admin());
    }

    #[test]
    fn only_free_is_metered() {
        assert!(PlanTier::Free.is_metered());
        assert!(!PlanTier::Pro.is_metered());
        assert!(!PlanTier::Enterprise.is_metered());
    }
}
