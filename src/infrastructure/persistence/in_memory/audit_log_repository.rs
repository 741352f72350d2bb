//! # In-Memory Audit Log
//!
//! Append-only `Vec` of entries behind a lock. Entries are never mutated.

use crate::domain::entities::AuditLogEntry;
use crate::infrastructure::persistence::traits::{AuditFilter, AuditLogRepository, RepositoryResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`AuditLogRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogRepository {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl InMemoryAuditLogRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn append(&self, entry: &AuditLogEntry) -> RepositoryResult<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list(&self, filter: &AuditFilter) -> RepositoryResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(entries
            .iter()
            .rev()
            .filter(|e| {
                filter
                    .entity_type
                    .as_deref()
                    .is_none_or(|t| e.entity_type() == t)
            })
            .filter(|e| filter.action.is_none_or(|a| e.action() == a))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> RepositoryResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.entity_type() == entity_type && e.entity_id() == entity_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::AuditAction;
    use serde_json::json;

    fn entry(action: AuditAction, id: &str) -> AuditLogEntry {
        AuditLogEntry::new(action, "booking", id, "admin_1", json!({}))
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let log = InMemoryAuditLogRepository::new();
        log.append(&entry(AuditAction::BookingCreated, "BK-1")).await.unwrap();
        log.append(&entry(AuditAction::BookingApproved, "BK-1")).await.unwrap();
        log.append(&entry(AuditAction::EmailSent, "BK-1")).await.unwrap();

        let all = log.list(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action(), AuditAction::EmailSent);

        let approvals = log
            .list(&AuditFilter {
                action: Some(AuditAction::BookingApproved),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(approvals.len(), 1);

        let limited = log
            .list(&AuditFilter {
                limit: Some(2),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn entity_history_is_oldest_first() {
        let log = InMemoryAuditLogRepository::new();
        log.append(&entry(AuditAction::BookingCreated, "BK-1")).await.unwrap();
        log.append(&entry(AuditAction::BookingCreated, "BK-2")).await.unwrap();
        log.append(&entry(AuditAction::PaymentReceived, "BK-1")).await.unwrap();

        let history = log.find_by_entity("booking", "BK-1").await.unwrap();
        let actions: Vec<AuditAction> = history.iter().map(AuditLogEntry::action).collect();
        assert_eq!(actions, vec![AuditAction::BookingCreated, AuditAction::PaymentReceived]);
        assert_eq!(log.len(), 3);
    }
}
