//! Transactional e-mails sent by the booking workflow.

use crate::domain::entities::Booking;
use crate::infrastructure::notifications::EmailMessage;
use std::fmt::Write as _;

/// Escapes text for interpolation into HTML.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn currency_symbol(code: &str) -> &'static str {
    match code {
        "GBP" => "£",
        "EUR" => "€",
        _ => "$",
    }
}

/// Customer address, if the booking carries a usable one.
pub(crate) fn recipient(booking: &Booking) -> Option<&str> {
    let email = booking.customer().email.trim();
    (!email.is_empty()).then_some(email)
}

fn wrap(body: &str) -> String {
    format!(r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">{body}</div>"#)
}

/// Sent on creation; the booking awaits approval.
pub(crate) fn received(booking: &Booking, to: &str) -> EmailMessage {
    let price = booking.price();
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<h1 style="color: #003366;">Booking Received</h1>
<p>Dear {name},</p>
<p>Your booking <strong>{id}</strong> has been received and is pending approval.</p>
<div style="background: #f4f4f4; padding: 15px; border-radius: 8px; margin: 20px 0;">
<p><strong>Carrier:</strong> {carrier}</p>
<p><strong>Price:</strong> {symbol}{amount:.2}</p>
<p><strong>Origin:</strong> {origin}</p>
<p><strong>Destination:</strong> {destination}</p>
<p><strong>Pickup Date:</strong> {date}</p>
</div>
<p>We will notify you once your shipment is fully approved.</p>
<p>Best regards,<br/>The freightcode Team</p>"#,
        name = escape_html(&booking.customer().name),
        id = booking.id(),
        carrier = escape_html(booking.carrier_name()),
        symbol = currency_symbol(price.currency().as_str()),
        amount = price.amount(),
        origin = escape_html(&booking.pickup().address),
        destination = escape_html(&booking.delivery().address),
        date = escape_html(&booking.pickup().date),
    );
    EmailMessage::new(to, format!("Booking Confirmation: {}", booking.id()), wrap(&body))
}

/// Subject line of the approval e-mail, also written to the audit log.
pub(crate) const APPROVED_SUBJECT: &str = "Booking Approved";

/// Subject line of the rejection e-mail, also written to the audit log.
pub(crate) const REJECTED_SUBJECT: &str = "Booking Rejected";

pub(crate) fn approved(booking: &Booking, to: &str) -> EmailMessage {
    EmailMessage::new(
        to,
        format!("{APPROVED_SUBJECT}: {}", booking.id()),
        wrap(&format!(
            r#"<h1 style="color: #22c55e;">Booking Approved!</h1><p>Your booking {} has been approved.</p>"#,
            booking.id()
        )),
    )
}

pub(crate) fn rejected(booking: &Booking, to: &str, reason: &str) -> EmailMessage {
    EmailMessage::new(
        to,
        format!("Booking Update: {}", booking.id()),
        wrap(&format!(
            r#"<h1 style="color: #ef4444;">Booking Could Not Be Processed</h1><p>Reason: {}</p>"#,
            escape_html(reason)
        )),
    )
}

pub(crate) fn payment_received(booking: &Booking, to: &str, dashboard_url: &str) -> EmailMessage {
    let price = booking.price();
    let body = format!(
        r#"<h1 style="color: #003366;">Payment Successful</h1>
<p>Dear {name},</p>
<p>We have received your payment for booking <strong>{id}</strong>.</p>
<p>Your shipment is now <strong>Confirmed</strong> and will be processed immediately.</p>
<p style="color: #166534; font-weight: bold;">Payment Verified: {amount} {currency}</p>
<a href="{url}/shipments">Track Shipment</a>"#,
        name = escape_html(&booking.customer().name),
        id = booking.id(),
        amount = price.amount(),
        currency = price.currency(),
        url = dashboard_url.trim_end_matches('/'),
    );
    EmailMessage::new(
        to,
        format!("Payment Received: Booking {} Confirmed", booking.id()),
        wrap(&body),
    )
}

pub(crate) fn status_confirmed(booking: &Booking, to: &str, dashboard_url: &str) -> EmailMessage {
    let body = format!(
        r#"<h1 style="color: #003366;">Booking Confirmed!</h1>
<p>Dear {name},</p>
<p>Good news! Your booking <strong>{id}</strong> has been confirmed.</p>
<p>Our team has verified your route and cargo details. A carrier has been assigned.</p>
<a href="{url}/dashboard">View Dashboard</a>"#,
        name = escape_html(&booking.customer().name),
        id = booking.id(),
        url = dashboard_url.trim_end_matches('/'),
    );
    EmailMessage::new(to, format!("Booking Confirmed: {}", booking.id()), wrap(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn currency_symbols() {
        assert_eq!(currency_symbol("GBP"), "£");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("USD"), "$");
    }
}
