//! # Contract Rate Adapter
//!
//! Serves negotiated contract rates from a [`ContractRateRepository`].
//!
//! Only contracts in force now and visible to the requesting organization are
//! returned. An empty lane is not an error: most lanes carry no contract.

use crate::domain::value_objects::{ProviderId, Timestamp};
use crate::infrastructure::persistence::traits::ContractRateRepository;
use crate::infrastructure::rates::error::{ProviderError, ProviderResult};
use crate::infrastructure::rates::provider_rate::ProviderRate;
use crate::infrastructure::rates::traits::{RateProvider, RateQuery};
use async_trait::async_trait;
use std::sync::Arc;

/// Store lookups are local; keep the timeout short.
const CONTRACT_TIMEOUT_MS: u64 = 1000;

/// Adapter over the contract rate store.
#[derive(Debug)]
pub struct ContractRateAdapter {
    id: ProviderId,
    repository: Arc<dyn ContractRateRepository>,
}

impl ContractRateAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(repository: Arc<dyn ContractRateRepository>) -> Self {
        Self {
            id: ProviderId::new("contracts"),
            repository,
        }
    }
}

#[async_trait]
impl RateProvider for ContractRateAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn timeout_ms(&self) -> u64 {
        CONTRACT_TIMEOUT_MS
    }

    async fn quote(&self, query: &RateQuery) -> ProviderResult<Vec<ProviderRate>> {
        let now = Timestamp::now();
        let contracts = self
            .repository
            .find_by_lane(&query.origin, &query.destination)
            .await
            .map_err(|e| ProviderError::internal(format!("contract lookup failed: {e}")))?;

        let total = contracts.len();
        let rates: Vec<ProviderRate> = contracts
            .into_iter()
            .filter(|c| c.is_active_at(&now) && c.is_visible_to(query.organization.as_ref()))
            .map(ProviderRate::Contract)
            .collect();

        if rates.len() < total {
            tracing::debug!(
                lane = %query.lane_label(),
                skipped = total - rates.len(),
                "inactive or private contracts skipped"
            );
        }
        Ok(rates)
    }
}
