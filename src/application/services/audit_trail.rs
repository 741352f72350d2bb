//! # Audit Trail
//!
//! Append-only record of workflow actions, readable by administrators.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::AuditLogEntry;
use crate::domain::value_objects::Identity;
use crate::infrastructure::persistence::{AccountDirectory, AuditFilter, AuditLogRepository};
use std::sync::Arc;

/// Audit use cases.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    entries: Arc<dyn AuditLogRepository>,
    accounts: Arc<dyn AccountDirectory>,
}

impl AuditTrail {
    /// Creates the trail.
    #[must_use]
    pub fn new(entries: Arc<dyn AuditLogRepository>, accounts: Arc<dyn AccountDirectory>) -> Self {
        Self { entries, accounts }
    }

    /// Appends an entry. A failed append is logged; the action it records
    /// has already happened and is not rolled back.
    pub async fn record(&self, entry: AuditLogEntry) {
        let action = entry.action();
        let entity_id = entry.entity_id().to_string();
        match self.entries.append(&entry).await {
            Ok(()) => tracing::debug!(action = action.as_str(), entity_id = %entity_id, "audit entry recorded"),
            Err(e) => tracing::error!(action = action.as_str(), entity_id = %entity_id, error = %e, "audit entry lost"),
        }
    }

    /// Entries matching `filter`, newest first. Administrators only.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` for guests
    /// - `Unauthorized` for non-administrators
    pub async fn list(&self, actor: &Identity, filter: &AuditFilter) -> ApplicationResult<Vec<AuditLogEntry>> {
        let subject = actor.subject.as_ref().ok_or(ApplicationError::Unauthenticated)?;
        if !self.accounts.role_of(subject).await?.is_admin() {
            return Err(ApplicationError::unauthorized("audit log requires an admin role"));
        }
        Ok(self.entries.list(filter).await?)
    }

    /// Every entry for one entity, oldest first.
    ///
    /// # Errors
    ///
    /// `Repository` on storage failure.
    pub async fn entity_history(&self, entity_type: &str, entity_id: &str) -> ApplicationResult<Vec<AuditLogEntry>> {
        Ok(self.entries.find_by_entity(entity_type, entity_id).await?)
    }
}
