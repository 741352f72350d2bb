//! # Rate Provider Traits
//!
//! Ports implemented by every external rate source.
//!
//! An adapter receives a canonical [`RateQuery`] and answers with zero or
//! more [`ProviderRate`] records in its own variant of the sum type, or a
//! [`ProviderError`](super::error::ProviderError). Upstream schemas,
//! authentication and failure modes stay private to the adapter.
//!
//! # Examples
//!
//! ```ignore
//! use freight_quote::infrastructure::rates::traits::RateProvider;
//!
//! async fn quote_all(provider: &dyn RateProvider, query: &RateQuery) {
//!     match provider.quote(query).await {
//!         Ok(rates) => println!("{} returned {}", provider.provider_id(), rates.len()),
//!         Err(e) => eprintln!("{} failed: {}", provider.provider_id(), e),
//!     }
//! }
//! ```

use crate::domain::entities::{LaneCodes, RateRequest};
use crate::domain::value_objects::{LocationCode, OrganizationId, ProviderId, ServiceType};
use crate::infrastructure::rates::error::ProviderResult;
use crate::infrastructure::rates::provider_rate::ProviderRate;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Canonical input handed to every provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    /// Resolved origin code.
    pub origin: LocationCode,
    /// Resolved destination code.
    pub destination: LocationCode,
    /// Origin as the customer typed it.
    pub origin_name: String,
    /// Destination as the customer typed it.
    pub destination_name: String,
    /// Cargo weight in kilograms.
    pub weight_kg: Decimal,
    /// Cargo volume in cubic metres, when known.
    pub volume_cbm: Option<Decimal>,
    /// Requested service.
    pub service_type: ServiceType,
    /// Organization the quote is priced for.
    pub organization: Option<OrganizationId>,
}

impl RateQuery {
    /// Builds a query from a validated request and its resolved lane.
    #[must_use]
    pub fn from_request(
        request: &RateRequest,
        lane: &LaneCodes,
        organization: Option<OrganizationId>,
    ) -> Self {
        Self {
            origin: lane.origin.clone(),
            destination: lane.destination.clone(),
            origin_name: request.origin().to_string(),
            destination_name: request.destination().to_string(),
            weight_kg: request.weight_kg(),
            volume_cbm: request.volume_cbm(),
            service_type: request.service_type(),
            organization,
        }
    }

    /// Lane label used in logs (`CNSHA-NLRTM`).
    #[must_use]
    pub fn lane_label(&self) -> String {
        format!("{}-{}", self.origin, self.destination)
    }
}

/// An external rate source.
///
/// Implementations must be safe to call concurrently; the aggregator fans out
/// to every registered provider for each quote.
#[async_trait]
pub trait RateProvider: Send + Sync + fmt::Debug {
    /// Returns the provider identifier.
    fn provider_id(&self) -> &ProviderId;

    /// Returns the per-call timeout in milliseconds.
    fn timeout_ms(&self) -> u64;

    /// Requests rates for a lane.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Timeout` if the upstream does not answer in time
    /// - `ProviderError::Authentication` if credentials are rejected
    /// - `ProviderError::Schema` if the response shape is unexpected
    /// - `ProviderError::NoRateForLane` if the lane has no price
    /// - `ProviderError::UnsupportedMode` if the service type is not served
    async fn quote(&self, query: &RateQuery) -> ProviderResult<Vec<ProviderRate>>;
}

/// Source of the providers taking part in an aggregation.
#[async_trait]
pub trait ProviderRegistry: Send + Sync + fmt::Debug {
    /// Returns the providers currently available.
    async fn available_providers(&self) -> Vec<Arc<dyn RateProvider>>;
}
