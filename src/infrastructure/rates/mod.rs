//! # Rate Providers
//!
//! Adapters for external and stored rate sources.
//!
//! ## Adapters
//!
//! - [`FreightosAdapter`]: per-mode min/max estimates keyed by location code
//! - [`SeaRatesAdapter`]: GraphQL carrier rates keyed by coordinates
//! - [`ContractRateAdapter`]: negotiated contract rates
//!
//! Each adapter answers with [`ProviderRate`] records of its own variant and
//! reports failures as [`ProviderError`]; the aggregator absorbs both.

pub mod contract;
pub mod error;
pub mod freightos;
pub mod http_client;
pub mod provider_rate;
pub mod registry;
pub mod searates;
pub mod token_cache;
pub mod traits;

pub use contract::ContractRateAdapter;
pub use error::{ProviderError, ProviderResult};
pub use freightos::{FreightosAdapter, FreightosConfig};
pub use provider_rate::{
    EstimatedRate, FreightosMode, FreightosModeRate, LooseRate, ProviderRate, SeaRatesRate,
};
pub use registry::StaticProviderRegistry;
pub use searates::{SeaRatesAdapter, SeaRatesConfig};
pub use token_cache::TokenCache;
pub use traits::{ProviderRegistry, RateProvider, RateQuery};
