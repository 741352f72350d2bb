//! # In-Memory Notification Repository
//!
//! In-memory implementation of [`NotificationRepository`].

use crate::domain::entities::Notification;
use crate::domain::value_objects::{NotificationId, SubjectId};
use crate::infrastructure::persistence::traits::{
    NotificationRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`NotificationRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    storage: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl InMemoryNotificationRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(notification.id()) {
            return Err(RepositoryError::duplicate("Notification", notification.id().as_str()));
        }
        storage.insert(notification.id().clone(), notification.clone());
        Ok(())
    }

    async fn get(&self, id: &NotificationId) -> RepositoryResult<Option<Notification>> {
        Ok(self.storage.read().await.get(id).cloned())
    }

    async fn update(&self, notification: &Notification) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        match storage.get_mut(notification.id()) {
            Some(stored) => {
                *stored = notification.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found(
                "Notification",
                notification.id().as_str(),
            )),
        }
    }

    async fn find_by_recipient(&self, recipient: &SubjectId, limit: usize) -> RepositoryResult<Vec<Notification>> {
        let storage = self.storage.read().await;
        let mut found: Vec<Notification> = storage
            .values()
            .filter(|n| n.recipient() == recipient)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| a.id().cmp(b.id())));
        found.truncate(limit);
        Ok(found)
    }

    async fn count_unread(&self, recipient: &SubjectId) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        let count = storage
            .values()
            .filter(|n| n.recipient() == recipient && !n.is_read())
            .count();
        Ok(count as u64)
    }

    async fn mark_all_read(&self, recipient: &SubjectId) -> RepositoryResult<u64> {
        let mut storage = self.storage.write().await;
        let mut changed = 0u64;
        for notification in storage
            .values_mut()
            .filter(|n| n.recipient() == recipient && !n.is_read())
        {
            notification.mark_read();
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{NotificationKind, NotificationPriority};

    fn note(to: &str) -> Notification {
        Notification::new(
            SubjectId::new(to),
            "Booking Approved",
            "Your booking is approved",
            NotificationKind::Shipment,
            NotificationPriority::High,
        )
    }

    #[tokio::test]
    async fn unread_counting_and_mark_all() {
        let repo = InMemoryNotificationRepository::new();
        repo.insert(&note("u1")).await.unwrap();
        repo.insert(&note("u1")).await.unwrap();
        repo.insert(&note("u2")).await.unwrap();

        assert_eq!(repo.count_unread(&SubjectId::new("u1")).await.unwrap(), 2);
        assert_eq!(repo.mark_all_read(&SubjectId::new("u1")).await.unwrap(), 2);
        assert_eq!(repo.count_unread(&SubjectId::new("u1")).await.unwrap(), 0);
        assert_eq!(repo.count_unread(&SubjectId::new("u2")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_and_limit() {
        let repo = InMemoryNotificationRepository::new();
        let mut n = note("u1");
        repo.insert(&n).await.unwrap();
        repo.insert(&note("u1")).await.unwrap();

        n.mark_read();
        repo.update(&n).await.unwrap();
        assert!(repo.get(n.id()).await.unwrap().unwrap().is_read());
        assert_eq!(repo.find_by_recipient(&SubjectId::new("u1"), 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_fails() {
        let repo = InMemoryNotificationRepository::new();
        let err = repo.update(&note("u1")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.is_empty());
    }
}
