//! # E-mail Delivery
//!
//! [`EmailSender`] port with two implementations:
//!
//! - [`SmtpEmailSender`]: SMTP delivery through `lettre`
//! - [`LogEmailSender`]: logs each message and keeps a short history,
//!   used in development and tests

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Messages kept by [`LogEmailSender`].
const LOG_HISTORY: usize = 100;

/// An HTML e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

impl EmailMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// E-mail delivery failure.
#[derive(Debug, Clone, Error)]
pub enum EmailError {
    /// Sender or recipient address is malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Message could not be assembled.
    #[error("message build failed: {0}")]
    Build(String),

    /// Transport failure.
    #[error("smtp transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether another attempt may succeed.
        transient: bool,
    },
}

impl EmailError {
    /// Returns true if a later attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { transient: true, .. })
    }
}

/// Result type for e-mail delivery.
pub type EmailResult<T> = Result<T, EmailError>;

/// Delivers e-mails.
#[async_trait]
pub trait EmailSender: Send + Sync + fmt::Debug {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// - `EmailError::InvalidAddress` for malformed addresses
    /// - `EmailError::Transport` if the server refuses or is unreachable
    async fn send(&self, message: &EmailMessage) -> EmailResult<()>;
}

/// Logs messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender {
    history: Arc<Mutex<VecDeque<EmailMessage>>>,
}

impl LogEmailSender {
    /// Creates a sender with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent messages, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.history.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "email (log only)");
        let mut history = self.history.lock();
        if history.len() == LOG_HISTORY {
            history.pop_front();
        }
        history.push_back(message.clone());
        Ok(())
    }
}

/// Connection security for SMTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465.
    Tls,
    /// STARTTLS upgrade, usually port 587.
    #[default]
    StartTls,
    /// Unencrypted, for local relays only.
    Plain,
}

/// SMTP settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login user; no authentication when `None`.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Connection security.
    pub security: SmtpSecurity,
    /// `From` address.
    pub from: String,
}

/// Sends through an SMTP server.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl fmt::Debug for SmtpEmailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpEmailSender")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpEmailSender {
    /// Builds the transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// - `EmailError::InvalidAddress` if `from` is malformed
    /// - `EmailError::Transport` if the TLS relay cannot be configured
    pub fn new(settings: &SmtpSettings) -> EmailResult<Self> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {e}", settings.from)))?;

        let builder = match settings.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| transport_error(&e))?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(|e| transport_error(&e))?
            }
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        };
        let builder = builder.port(settings.port);
        let builder = match (&settings.username, &settings.password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn transport_error(error: &lettre::transport::smtp::Error) -> EmailError {
    EmailError::Transport {
        message: error.to_string(),
        transient: !error.is_permanent(),
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<()> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {e}", message.to)))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| transport_error(&e))?;
        tracing::debug!(to = %message.to, subject = %message.subject, "email delivered");
        Ok(())
    }
}
