//! # Bootstrap
//!
//! Wires configuration, stores, rate providers and services into the REST
//! state. Shared by the binary and the integration tests.

use crate::api::rest::AppState;
use crate::application::services::{
    AuditTrail, BookingStores, BookingWorkflow, NotificationService, QuoteService, RateAggregator,
};
use crate::config::{AppConfig, EmailMode};
use crate::domain::services::{LocationResolver, PricingEstimator};
use crate::infrastructure::notifications::{
    EmailResult, EmailSender, LogEmailSender, Outbox, SmtpEmailSender,
};
use crate::infrastructure::persistence::in_memory::{
    InMemoryAccountDirectory, InMemoryAuditLogRepository, InMemoryBookingRepository,
    InMemoryContractRateRepository, InMemoryNotificationRepository,
    InMemoryPaymentAttemptRepository, InMemoryQuoteRepository,
};
use crate::infrastructure::persistence::{
    AccountDirectory, AuditLogRepository, BookingRepository, ContractRateRepository,
    NotificationRepository, PaymentAttemptRepository, QuoteRepository,
};
use crate::infrastructure::rates::{
    ContractRateAdapter, FreightosAdapter, SeaRatesAdapter, StaticProviderRegistry,
};
use std::sync::Arc;

/// Every store the service uses.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Quotes.
    pub quotes: Arc<dyn QuoteRepository>,
    /// Bookings.
    pub bookings: Arc<dyn BookingRepository>,
    /// Payment-attempt stubs.
    pub payments: Arc<dyn PaymentAttemptRepository>,
    /// Audit log.
    pub audit: Arc<dyn AuditLogRepository>,
    /// In-app notifications.
    pub notifications: Arc<dyn NotificationRepository>,
    /// Negotiated contract rates.
    pub contracts: Arc<dyn ContractRateRepository>,
    /// Roles and plans.
    pub accounts: Arc<dyn AccountDirectory>,
}

impl Stores {
    /// Fresh in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::in_memory_with_accounts(Arc::new(InMemoryAccountDirectory::new()))
    }

    /// In-memory stores around a given account directory.
    #[must_use]
    pub fn in_memory_with_accounts(accounts: Arc<dyn AccountDirectory>) -> Self {
        Self {
            quotes: Arc::new(InMemoryQuoteRepository::new()),
            bookings: Arc::new(InMemoryBookingRepository::new()),
            payments: Arc::new(InMemoryPaymentAttemptRepository::new()),
            audit: Arc::new(InMemoryAuditLogRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
            contracts: Arc::new(InMemoryContractRateRepository::new()),
            accounts,
        }
    }
}

/// Registers the contract source and every external provider with usable
/// credentials. Providers without credentials are skipped with a warning.
#[must_use]
pub fn provider_registry(config: &AppConfig, contracts: Arc<dyn ContractRateRepository>) -> StaticProviderRegistry {
    let mut registry = StaticProviderRegistry::new();
    registry.register(Arc::new(ContractRateAdapter::new(contracts)));

    match config.freightos.provider_config() {
        Some(settings) => match FreightosAdapter::new(settings) {
            Ok(adapter) => registry.register(Arc::new(adapter)),
            Err(e) => tracing::error!(error = %e, "freightos adapter could not be built"),
        },
        None => tracing::warn!("freightos disabled or api key missing; provider not registered"),
    }

    match config.searates.provider_config() {
        Some(settings) => match SeaRatesAdapter::new(settings) {
            Ok(adapter) => registry.register(Arc::new(adapter)),
            Err(e) => tracing::error!(error = %e, "searates adapter could not be built"),
        },
        None => tracing::warn!("searates disabled or credentials missing; provider not registered"),
    }

    registry
}

/// E-mail sender for the configured mode.
///
/// # Errors
///
/// Fails if the SMTP settings are unusable.
pub fn email_sender(config: &AppConfig) -> EmailResult<Arc<dyn EmailSender>> {
    match config.email.mode {
        EmailMode::Log => Ok(Arc::new(LogEmailSender::new())),
        EmailMode::Smtp => Ok(Arc::new(SmtpEmailSender::new(&config.email.smtp())?)),
    }
}

/// Builds the REST state.
#[must_use]
pub fn app_state(
    config: &AppConfig,
    stores: Stores,
    registry: StaticProviderRegistry,
    outbox: Arc<dyn Outbox>,
) -> Arc<AppState> {
    let resolver = LocationResolver::default();
    let aggregator = Arc::new(RateAggregator::new(
        resolver.clone(),
        PricingEstimator::default(),
        Arc::new(registry),
        config.aggregation.to_config(),
    ));
    let quotes = QuoteService::new(aggregator, Arc::clone(&stores.quotes), Arc::clone(&stores.accounts))
        .with_free_monthly_limit(config.plans.free_monthly_quotes);
    let notifications = NotificationService::new(Arc::clone(&stores.notifications));
    let audit = AuditTrail::new(Arc::clone(&stores.audit), Arc::clone(&stores.accounts));
    let bookings = BookingWorkflow::new(
        BookingStores {
            quotes: stores.quotes,
            bookings: stores.bookings,
            payments: stores.payments,
            audit: stores.audit,
            notifications: stores.notifications,
            accounts: stores.accounts,
        },
        outbox,
        config.booking_workflow(),
    );

    Arc::new(AppState {
        quotes: Arc::new(quotes),
        bookings: Arc::new(bookings),
        notifications,
        audit,
        locations: resolver,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_contract_source_without_credentials() {
        let registry = provider_registry(&AppConfig::default(), Stores::in_memory().contracts);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn configured_freightos_is_registered() {
        let config = AppConfig::from_toml("[freightos]\napi_key = \"k\"").unwrap();
        let registry = provider_registry(&config, Stores::in_memory().contracts);
        assert_eq!(registry.len(), 2);
    }
}
