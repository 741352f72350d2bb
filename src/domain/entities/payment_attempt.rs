//! # Payment Attempt
//!
//! Pending invoice stub written when a booking is created so that the
//! booking is immediately visible to payment reconciliation.

use crate::domain::entities::booking::Booking;
use crate::domain::value_objects::{BookingId, Currency, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payer block of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    /// E-mail.
    pub email: String,
    /// First name, `Guest` when unknown.
    pub first_name: String,
    /// Remaining name parts.
    pub last_name: String,
    /// Subject id, or `TRANSIT_USER` for guests.
    pub user_id: String,
}

impl Payer {
    /// Splits the customer name on the first space.
    #[must_use]
    pub fn from_name(name: &str, email: &str, user_id: Option<&str>) -> Self {
        let mut parts = name.split_whitespace();
        let first_name = parts
            .next()
            .map_or_else(|| "Guest".to_string(), ToString::to_string);
        let last_name = parts.collect::<Vec<_>>().join(" ");
        Self {
            email: email.to_string(),
            first_name,
            last_name,
            user_id: user_id.unwrap_or("TRANSIT_USER").to_string(),
        }
    }
}

/// Payment state of the stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentAttemptStatus {
    /// Awaiting payment.
    Pending,
}

/// Monetary totals of the stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTotals {
    /// Grand total.
    pub grand_total: Decimal,
    /// Subtotal.
    pub subtotal: Decimal,
    /// Tax, always zero for freight.
    pub tax_total: Decimal,
    /// Currency.
    pub currency: Currency,
}

/// Invoice stub inserted at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    /// `PAY-<booking id>`.
    pub payment_id: String,
    /// `INV-<booking id>`.
    pub invoice_id: String,
    /// Booking this stub belongs to.
    pub booking_id: BookingId,
    /// Always pending at creation.
    pub status: PaymentAttemptStatus,
    /// Payer.
    pub payer: Payer,
    /// Totals.
    pub totals: PaymentTotals,
    /// Plan line, e.g. `Freight: Maersk - Ocean Freight`.
    pub description: String,
    /// Free-text route, when known.
    pub route: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

impl PaymentAttempt {
    /// Builds the pending stub for a freshly created booking.
    #[must_use]
    pub fn pending_for(booking: &Booking) -> Self {
        let amount = booking.price().amount();
        let customer = booking.customer();
        Self {
            payment_id: format!("PAY-{}", booking.id()),
            invoice_id: format!("INV-{}", booking.id()),
            booking_id: booking.id().clone(),
            status: PaymentAttemptStatus::Pending,
            payer: Payer::from_name(
                &customer.name,
                &customer.email,
                booking.requested_by().map(|s| s.as_str()),
            ),
            totals: PaymentTotals {
                grand_total: amount,
                subtotal: amount,
                tax_total: Decimal::ZERO,
                currency: booking.price().currency().clone(),
            },
            description: format!(
                "Freight: {} - {}",
                booking.carrier_name().trim(),
                booking.service_type().trim()
            ),
            route: booking.route().map(|(o, d)| format!("{o} -> {d}")),
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payer_name_split() {
        let payer = Payer::from_name("Ada King Lovelace", "ada@example.com", Some("u1"));
        assert_eq!(payer.first_name, "Ada");
        assert_eq!(payer.last_name, "King Lovelace");
        assert_eq!(payer.user_id, "u1");
    }

    #[test]
    fn payer_defaults_for_guest() {
        let payer = Payer::from_name("", "x@example.com", None);
        assert_eq!(payer.first_name, "Guest");
        assert_eq!(payer.last_name, "");
        assert_eq!(payer.user_id, "TRANSIT_USER");
    }
}
