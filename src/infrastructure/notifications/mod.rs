//! # Notification Delivery
//!
//! Outbox queue and e-mail senders.

pub mod email;
pub mod outbox;

pub use email::{
    EmailError, EmailMessage, EmailResult, EmailSender, LogEmailSender, SmtpEmailSender,
    SmtpSecurity, SmtpSettings,
};
pub use outbox::{
    ChannelOutbox, InMemoryOutbox, Outbox, OutboxError, OutboxMessage, OutboxReceiver,
    OutboxResult, OutboxWorker, RetryPolicy,
};
