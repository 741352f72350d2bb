//! # In-Memory Contract Rates
//!
//! Contracts keyed by id; lane lookups scan the map.

use crate::domain::entities::ContractRate;
use crate::domain::value_objects::LocationCode;
use crate::infrastructure::persistence::traits::{ContractRateRepository, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`ContractRateRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryContractRateRepository {
    storage: Arc<RwLock<HashMap<String, ContractRate>>>,
}

impl InMemoryContractRateRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractRateRepository for InMemoryContractRateRepository {
    async fn save(&self, contract: &ContractRate) -> RepositoryResult<()> {
        self.storage
            .write()
            .await
            .insert(contract.id().to_string(), contract.clone());
        Ok(())
    }

    async fn find_by_lane(
        &self,
        origin: &LocationCode,
        destination: &LocationCode,
    ) -> RepositoryResult<Vec<ContractRate>> {
        let storage = self.storage.read().await;
        let mut found: Vec<ContractRate> = storage
            .values()
            .filter(|c| c.origin() == origin && c.destination() == destination)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(found)
    }
}
