//! # Provider Registry
//!
//! Fixed set of providers assembled at start-up.

use crate::infrastructure::rates::traits::{ProviderRegistry, RateProvider};
use async_trait::async_trait;
use std::sync::Arc;

/// Registry holding the providers registered at start-up.
#[derive(Debug, Clone, Default)]
pub struct StaticProviderRegistry {
    providers: Vec<Arc<dyn RateProvider>>,
}

impl StaticProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider.
    pub fn register(&mut self, provider: Arc<dyn RateProvider>) {
        tracing::info!(provider = %provider.provider_id(), "rate provider registered");
        self.providers.push(provider);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn RateProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl ProviderRegistry for StaticProviderRegistry {
    async fn available_providers(&self) -> Vec<Arc<dyn RateProvider>> {
        self.providers.clone()
    }
}
