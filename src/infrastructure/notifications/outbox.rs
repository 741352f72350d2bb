//! # Outbox
//!
//! Side effects that must not block or fail the request that caused them.
//!
//! The request path calls [`Outbox::enqueue`], which returns as soon as the
//! message is queued. An [`OutboxWorker`] drains the queue in the background
//! and delivers each message with bounded retries.
//!
//! # Examples
//!
//! ```ignore
//! let (outbox, receiver) = ChannelOutbox::new(256);
//! let worker = OutboxWorker::new(receiver, Arc::new(LogEmailSender::new()), RetryPolicy::default());
//! let handle = worker.spawn();
//! outbox.enqueue(OutboxMessage::Email(message)).await?;
//! ```

use crate::infrastructure::notifications::email::{EmailMessage, EmailSender};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Deferred side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxMessage {
    /// Send an e-mail.
    Email(EmailMessage),
}

impl OutboxMessage {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
        }
    }
}

/// Queueing failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutboxError {
    /// Queue is at capacity.
    #[error("outbox is full")]
    Full,
    /// Worker has stopped.
    #[error("outbox is closed")]
    Closed,
}

/// Result type for outbox operations.
pub type OutboxResult<T> = Result<T, OutboxError>;

/// Accepts deferred side effects.
#[async_trait]
pub trait Outbox: Send + Sync + fmt::Debug {
    /// Queues a message without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError` if the message cannot be queued.
    async fn enqueue(&self, message: OutboxMessage) -> OutboxResult<()>;
}

/// Outbox backed by a bounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelOutbox {
    sender: mpsc::Sender<OutboxMessage>,
}

/// Receiving half handed to [`OutboxWorker`].
#[derive(Debug)]
pub struct OutboxReceiver(mpsc::Receiver<OutboxMessage>);

impl ChannelOutbox {
    /// Creates the outbox and the receiver for its worker.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, OutboxReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, OutboxReceiver(receiver))
    }
}

#[async_trait]
impl Outbox for ChannelOutbox {
    async fn enqueue(&self, message: OutboxMessage) -> OutboxResult<()> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(m) => {
                tracing::warn!(kind = m.kind(), "outbox full, message dropped");
                OutboxError::Full
            }
            mpsc::error::TrySendError::Closed(_) => OutboxError::Closed,
        })
    }
}

/// Outbox that only records messages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutbox {
    messages: Arc<Mutex<Vec<OutboxMessage>>>,
}

impl InMemoryOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages queued so far.
    #[must_use]
    pub fn messages(&self) -> Vec<OutboxMessage> {
        self.messages.lock().clone()
    }

    /// Queued e-mails.
    #[must_use]
    pub fn emails(&self) -> Vec<EmailMessage> {
        self.messages
            .lock()
            .iter()
            .map(|m| match m {
                OutboxMessage::Email(e) => e.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl Outbox for InMemoryOutbox {
    async fn enqueue(&self, message: OutboxMessage) -> OutboxResult<()> {
        self.messages.lock().push(message);
        Ok(())
    }
}

/// Delivery retry policy. Backoff grows linearly with the attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Delay after the first failure.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 120,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy. At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: usize, base_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff_ms,
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let attempt = u64::try_from(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt))
    }
}

/// Drains an [`OutboxReceiver`] and delivers each message.
#[derive(Debug)]
pub struct OutboxWorker {
    receiver: OutboxReceiver,
    email: Arc<dyn EmailSender>,
    policy: RetryPolicy,
}

impl OutboxWorker {
    /// Creates a worker.
    #[must_use]
    pub fn new(receiver: OutboxReceiver, email: Arc<dyn EmailSender>, policy: RetryPolicy) -> Self {
        Self {
            receiver,
            email,
            policy,
        }
    }

    /// Runs until every [`ChannelOutbox`] handle is dropped.
    pub async fn run(mut self) {
        tracing::info!(max_attempts = self.policy.max_attempts, "outbox worker started");
        while let Some(message) = self.receiver.0.recv().await {
            self.deliver(&message).await;
        }
        tracing::info!("outbox worker stopped");
    }

    /// Spawns [`run`](Self::run) on the tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Delivers one message. Returns true on success.
    async fn deliver(&self, message: &OutboxMessage) -> bool {
        match message {
            OutboxMessage::Email(email) => {
                for attempt in 1..=self.policy.max_attempts {
                    match self.email.send(email).await {
                        Ok(()) => return true,
                        Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                            let delay = self.policy.delay_for_attempt(attempt);
                            tracing::warn!(
                                to = %email.to,
                                attempt,
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                error = %e,
                                "email delivery failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        Err(e) => {
                            tracing::error!(
                                to = %email.to,
                                subject = %email.subject,
                                attempt,
                                error = %e,
                                "email delivery abandoned"
                            );
                            return false;
                        }
                    }
                }
                false
            }
        }
    }
}
