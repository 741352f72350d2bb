//! # Notification Service
//!
//! In-app notifications: delivery from workflow transitions and the
//! recipient's inbox operations.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::Notification;
use crate::domain::value_objects::{NotificationId, SubjectId};
use crate::infrastructure::persistence::NotificationRepository;
use std::sync::Arc;

/// Default inbox page size.
pub const DEFAULT_INBOX_LIMIT: usize = 50;

/// Notification use cases.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Creates the service.
    #[must_use]
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Stores a notification. Failures are logged and swallowed; a
    /// notification never fails the transition that raised it.
    pub async fn notify(&self, notification: Notification) {
        let recipient = notification.recipient().clone();
        let title = notification.title().to_string();
        match self.notifications.insert(&notification).await {
            Ok(()) => tracing::debug!(recipient = %recipient, title, "notification raised"),
            Err(e) => tracing::error!(recipient = %recipient, title, error = %e, "notification not stored"),
        }
    }

    /// Newest notifications of `subject`.
    ///
    /// # Errors
    ///
    /// `Repository` on storage failure.
    pub async fn list(&self, subject: &SubjectId, limit: usize) -> ApplicationResult<Vec<Notification>> {
        Ok(self.notifications.find_by_recipient(subject, limit).await?)
    }

    /// Number of unread notifications of `subject`.
    ///
    /// # Errors
    ///
    /// `Repository` on storage failure.
    pub async fn unread_count(&self, subject: &SubjectId) -> ApplicationResult<u64> {
        Ok(self.notifications.count_unread(subject).await?)
    }

    /// Marks one notification read. Only the recipient may do so.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id is unknown
    /// - `Unauthorized` if `subject` is not the recipient
    pub async fn mark_read(&self, subject: &SubjectId, id: &NotificationId) -> ApplicationResult<Notification> {
        let mut notification = self
            .notifications
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Notification", id.as_str()))?;

        if notification.recipient() != subject {
            return Err(ApplicationError::unauthorized("notification belongs to another user"));
        }
        if !notification.is_read() {
            notification.mark_read();
            self.notifications.update(&notification).await?;
        }
        Ok(notification)
    }

    /// Marks every notification of `subject` read; returns how many changed.
    ///
    /// # Errors
    ///
    /// `Repository` on storage failure.
    pub async fn mark_all_read(&self, subject: &SubjectId) -> ApplicationResult<u64> {
        Ok(self.notifications.mark_all_read(subject).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{NotificationKind, NotificationPriority};
    use crate::infrastructure::persistence::in_memory::InMemoryNotificationRepository;

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(InMemoryNotificationRepository::new()))
    }

    fn note(to: &str) -> Notification {
        Notification::new(
            SubjectId::new(to),
            "Booking Approved",
            "Your booking BK-1 has been approved.",
            NotificationKind::Shipment,
            NotificationPriority::High,
        )
    }

    #[tokio::test]
    async fn inbox_flow() {
        let service = service();
        let alice = SubjectId::new("alice");
        let first = note("alice");
        let first_id = first.id().clone();
        service.notify(first).await;
        service.notify(note("alice")).await;
        service.notify(note("bob")).await;

        assert_eq!(service.list(&alice, 10).await.unwrap().len(), 2);
        assert_eq!(service.unread_count(&alice).await.unwrap(), 2);

        let read = service.mark_read(&alice, &first_id).await.unwrap();
        assert!(read.is_read());
        assert_eq!(service.unread_count(&alice).await.unwrap(), 1);

        assert_eq!(service.mark_all_read(&alice).await.unwrap(), 1);
        assert_eq!(service.unread_count(&alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn only_recipient_marks_read() {
        let service = service();
        let n = note("alice");
        let id = n.id().clone();
        service.notify(n).await;
        let err = service.mark_read(&SubjectId::new("mallory"), &id).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn unknown_notification() {
        let err = service()
            .mark_read(&SubjectId::new("alice"), &NotificationId::new("nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
