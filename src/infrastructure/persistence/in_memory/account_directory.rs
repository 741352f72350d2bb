//! # In-Memory Account Directory
//!
//! Static role and plan assignments, standing in for the identity provider.
//! Unknown subjects are members and unknown owners are on the free tier.

use crate::domain::value_objects::{Owner, PlanTier, Role, SubjectId};
use crate::infrastructure::persistence::traits::{AccountDirectory, RepositoryResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory implementation of [`AccountDirectory`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountDirectory {
    roles: Arc<RwLock<HashMap<SubjectId, Role>>>,
    plans: Arc<RwLock<HashMap<Owner, PlanTier>>>,
}

impl InMemoryAccountDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a role.
    pub fn set_role(&self, subject: SubjectId, role: Role) {
        self.roles.write().insert(subject, role);
    }

    /// Assigns a plan tier.
    pub fn set_plan(&self, owner: Owner, tier: PlanTier) {
        self.plans.write().insert(owner, tier);
    }

    /// Builder-style role assignment.
    #[must_use]
    pub fn with_role(self, subject: impl Into<SubjectId>, role: Role) -> Self {
        self.set_role(subject.into(), role);
        self
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn role_of(&self, subject: &SubjectId) -> RepositoryResult<Role> {
        Ok(self.roles.read().get(subject).copied().unwrap_or_default())
    }

    async fn plan_of(&self, owner: &Owner) -> RepositoryResult<PlanTier> {
        Ok(self.plans.read().get(owner).copied().unwrap_or_default())
    }
}
