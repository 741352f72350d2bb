//! # Notification
//!
//! In-app notification addressed to one subject. Only the read flag ever
//! changes after creation.

use crate::domain::value_objects::{
    NotificationId, NotificationKind, NotificationPriority, SubjectId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// In-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    id: NotificationId,
    recipient: SubjectId,
    title: String,
    message: String,
    kind: NotificationKind,
    priority: NotificationPriority,
    read: bool,
    action_url: Option<String>,
    created_at: Timestamp,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        recipient: SubjectId,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        priority: NotificationPriority,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            recipient,
            title: title.into(),
            message: message.into(),
            kind,
            priority,
            read: false,
            action_url: None,
            created_at: Timestamp::now(),
        }
    }

    /// Sets the link the UI follows.
    #[must_use]
    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Flips the read flag.
    pub fn mark_read(&mut self) {
        self.read = true;
    }

    /// Id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    /// Addressee.
    #[inline]
    #[must_use]
    pub fn recipient(&self) -> &SubjectId {
        &self.recipient
    }

    /// Title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Category.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Priority.
    #[inline]
    #[must_use]
    pub fn priority(&self) -> NotificationPriority {
        self.priority
    }

    /// Read flag.
    #[inline]
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Link, if any.
    #[must_use]
    pub fn action_url(&self) -> Option<&str> {
        self.action_url.as_deref()
    }

    /// Creation time.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
