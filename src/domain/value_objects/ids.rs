//! # Identifiers
//!
//! String-backed identifier newtypes.
//!
//! Generated identifiers ([`QuoteId`], [`BookingId`], [`NotificationId`],
//! [`AuditEntryId`]) carry a readable prefix followed by 12 upper-case hex
//! characters taken from a v4 UUID. Identifiers issued by collaborators
//! ([`SubjectId`], [`OrganizationId`], [`GuestId`]) and by rate sources
//! ([`CarrierId`], [`ProviderId`]) are opaque strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Returns `PREFIX-XXXXXXXXXXXX` with 12 random upper-case hex characters.
fn generate(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string().to_uppercase();
    let suffix: String = simple.chars().take(12).collect();
    format!("{prefix}-{suffix}")
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a persisted quote (`QT-…`).
    QuoteId
);
string_id!(
    /// Identifier of a booking (`BK-…`).
    BookingId
);
string_id!(
    /// Source-unique identifier of one carrier rate inside a quote.
    CarrierId
);
string_id!(
    /// Identifier of a rate provider (`estimator`, `freightos`, …).
    ProviderId
);
string_id!(
    /// Opaque authenticated subject issued by the identity provider.
    SubjectId
);
string_id!(
    /// Opaque organization identifier issued by the identity provider.
    OrganizationId
);
string_id!(
    /// Anonymous guest owner (`guest-…`).
    GuestId
);
string_id!(
    /// Identifier of an in-app notification (`NT-…`).
    NotificationId
);
string_id!(
    /// Identifier of an audit log entry (`AU-…`).
    AuditEntryId
);

impl QuoteId {
    /// Generates a fresh quote identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate("QT"))
    }
}

impl BookingId {
    /// Generates a fresh booking identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate("BK"))
    }

    /// Strips payment-reconciliation prefixes (`PAY-`, `INV-`).
    ///
    /// Payment callbacks sometimes echo the invoice or payment id instead of
    /// the booking id.
    ///
    /// # Examples
    ///
    /// ```
    /// use freight_quote::domain::value_objects::BookingId;
    ///
    /// let id = BookingId::from_reference("INV-BK-0123456789AB");
    /// assert_eq!(id.as_str(), "BK-0123456789AB");
    /// ```
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        let trimmed = reference.trim();
        let cleaned = trimmed
            .strip_prefix("INV-")
            .or_else(|| trimmed.strip_prefix("PAY-"))
            .unwrap_or(trimmed);
        Self(cleaned.to_string())
    }
}

impl GuestId {
    /// Generates a fresh guest identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("guest-{}", Uuid::new_v4().simple()))
    }
}

impl NotificationId {
    /// Generates a fresh notification identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate("NT"))
    }
}

impl AuditEntryId {
    /// Generates a fresh audit entry identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate("AU"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_quote_id_shape() {
        let id = QuoteId::generate();
        assert!(id.as_str().starts_with("QT-"));
        assert_eq!(id.as_str().len(), 15);
        assert!(
            id.as_str()[3..]
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase())
        );
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(BookingId::generate(), BookingId::generate());
        assert_ne!(GuestId::generate(), GuestId::generate());
    }

    #[test]
    fn booking_reference_cleanup() {
        assert_eq!(BookingId::from_reference("PAY-BK-1").as_str(), "BK-1");
        assert_eq!(BookingId::from_reference(" BK-1 ").as_str(), "BK-1");
    }

    #[test]
    fn serializes_transparently() {
        let id = CarrierId::new("searates-maersk-0");
        assert_eq!(
            serde_json::to_string(&id).ok().as_deref(),
            Some("\"searates-maersk-0\"")
        );
    }
}
