//! # Rate Aggregation
//!
//! Fans a rate request out to every registered provider concurrently,
//! always adds the synthetic estimate, normalizes everything and sorts by
//! price.
//!
//! ## Failure policy
//!
//! - unresolvable origin or destination fails fast with
//!   [`AggregationError::LocationNotFound`]
//! - a provider that errors, times out or panics is logged and skipped
//! - exceeding the overall timeout fails the whole call; partial results
//!   are discarded and outstanding provider calls are aborted
//!
//! Output order depends only on price (ties broken by carrier id), never on
//! which provider answered first. Carrier ids are unique within one result;
//! repeats get a numeric suffix before sorting.

use crate::application::services::normalization::RateNormalizer;
use crate::domain::entities::{CarrierRate, LaneCodes, RateRequest};
use crate::domain::services::{LocationResolver, PricingEstimator};
use crate::domain::value_objects::{CarrierId, OrganizationId, ProviderId, Timestamp};
use crate::infrastructure::rates::provider_rate::{EstimatedRate, LooseRate, ProviderRate};
use crate::infrastructure::rates::traits::{ProviderRegistry, RateQuery};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Configuration for rate aggregation.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Overall timeout in milliseconds.
    pub timeout_ms: u64,
    /// Upper bound for any single provider in milliseconds.
    pub per_provider_timeout_ms: u64,
    /// Validity of the synthetic estimate in hours.
    pub estimate_validity_hours: i64,
    /// Whether the synthetic estimate is added.
    pub include_estimate: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10000,
            per_provider_timeout_ms: 5000,
            estimate_validity_hours: 24,
            include_estimate: true,
        }
    }
}

impl AggregationConfig {
    /// Creates a configuration with the given overall timeout.
    #[must_use]
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Default::default()
        }
    }

    /// Sets the per-provider timeout.
    #[must_use]
    pub fn with_per_provider_timeout(mut self, timeout_ms: u64) -> Self {
        self.per_provider_timeout_ms = timeout_ms;
        self
    }

    /// Sets the estimate validity window.
    #[must_use]
    pub fn with_estimate_validity_hours(mut self, hours: i64) -> Self {
        self.estimate_validity_hours = hours;
        self
    }

    /// Disables the synthetic estimate.
    #[must_use]
    pub fn without_estimate(mut self) -> Self {
        self.include_estimate = false;
        self
    }
}

/// Error type for aggregation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// Origin or destination did not resolve.
    #[error("location not found: {origin} -> {destination}")]
    LocationNotFound {
        /// Origin as given.
        origin: String,
        /// Destination as given.
        destination: String,
    },

    /// Overall timeout exceeded.
    #[error("rate aggregation timed out")]
    Timeout,

    /// Nothing produced a rate.
    #[error("no rates available: {0}")]
    RateFetchFailed(String),
}

/// Result type for aggregation.
pub type AggregationResult<T> = Result<T, AggregationError>;

/// A provider that contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Provider.
    pub provider: ProviderId,
    /// Failure class (`timeout`, `no_rate_for_lane`, `panicked`, ...).
    pub kind: &'static str,
    /// Description.
    pub message: String,
}

/// Outcome of a successful aggregation.
#[derive(Debug, Clone)]
pub struct AggregatedRates {
    /// Resolved lane.
    pub lane: LaneCodes,
    /// Normalized rates, cheapest first.
    pub rates: Vec<CarrierRate>,
    /// Number of external providers queried.
    pub providers_queried: usize,
    /// Providers that failed, in registration order.
    pub failures: Vec<ProviderFailure>,
}

impl AggregatedRates {
    /// Number of providers that answered.
    #[must_use]
    pub fn providers_responded(&self) -> usize {
        self.providers_queried.saturating_sub(self.failures.len())
    }

    /// Cheapest rate.
    #[must_use]
    pub fn best_rate(&self) -> Option<&CarrierRate> {
        self.rates.first()
    }
}

type ProviderOutcome = Result<Vec<ProviderRate>, ProviderFailure>;

/// Collects and ranks rates from every source.
#[derive(Debug)]
pub struct RateAggregator {
    resolver: LocationResolver,
    estimator: PricingEstimator,
    registry: Arc<dyn ProviderRegistry>,
    normalizer: RateNormalizer,
    config: AggregationConfig,
}

impl RateAggregator {
    /// Creates an aggregator.
    #[must_use]
    pub fn new(
        resolver: LocationResolver,
        estimator: PricingEstimator,
        registry: Arc<dyn ProviderRegistry>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            resolver,
            estimator,
            registry,
            normalizer: RateNormalizer::new(config.estimate_validity_hours),
            config,
        }
    }

    /// Creates an aggregator with the built-in tables and default configuration.
    #[must_use]
    pub fn with_defaults(registry: Arc<dyn ProviderRegistry>) -> Self {
        Self::new(
            LocationResolver::default(),
            PricingEstimator::default(),
            registry,
            AggregationConfig::default(),
        )
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Location resolver used for lanes.
    #[must_use]
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Resolves both ends of a request.
    ///
    /// # Errors
    ///
    /// `AggregationError::LocationNotFound` if either end is unknown.
    pub fn resolve_lane(&self, request: &RateRequest) -> AggregationResult<LaneCodes> {
        match (
            self.resolver.resolve(request.origin()),
            self.resolver.resolve(request.destination()),
        ) {
            (Some(origin), Some(destination)) => Ok(LaneCodes {
                origin,
                destination,
            }),
            _ => {
                tracing::warn!(
                    origin = request.origin(),
                    destination = request.destination(),
                    "location not resolved"
                );
                Err(AggregationError::LocationNotFound {
                    origin: request.origin().to_string(),
                    destination: request.destination().to_string(),
                })
            }
        }
    }

    /// Collects, normalizes and sorts rates for a request.
    ///
    /// # Errors
    ///
    /// - `LocationNotFound` if the lane cannot be resolved
    /// - `Timeout` if the overall deadline passes
    /// - `RateFetchFailed` if no source produced a single rate
    pub async fn aggregate(
        &self,
        request: &RateRequest,
        organization: Option<OrganizationId>,
    ) -> AggregationResult<AggregatedRates> {
        let lane = self.resolve_lane(request)?;
        let query = RateQuery::from_request(request, &lane, organization);

        let overall = Duration::from_millis(self.config.timeout_ms);
        let Ok((provider_rates, providers_queried, failures)) =
            timeout(overall, self.collect(request, &query)).await
        else {
            tracing::error!(lane = %query.lane_label(), timeout_ms = self.config.timeout_ms, "rate aggregation timed out");
            return Err(AggregationError::Timeout);
        };

        let now = Timestamp::now();
        let mut rates: Vec<CarrierRate> = provider_rates
            .into_iter()
            .map(|rate| self.normalizer.normalize(rate, now))
            .collect();
        dedupe_carrier_ids(&mut rates);
        sort_by_price(&mut rates);

        if rates.is_empty() {
            let reasons: Vec<String> = failures
                .iter()
                .map(|f| format!("{}: {}", f.provider, f.message))
                .collect();
            return Err(AggregationError::RateFetchFailed(if reasons.is_empty() {
                "no rate sources configured".to_string()
            } else {
                reasons.join("; ")
            }));
        }

        tracing::info!(
            lane = %query.lane_label(),
            rates = rates.len(),
            providers_queried,
            providers_failed = failures.len(),
            "rates aggregated"
        );

        Ok(AggregatedRates {
            lane,
            rates,
            providers_queried,
            failures,
        })
    }

    /// Runs every source. Results come back in registration order with the
    /// estimate and submitted rates first.
    async fn collect(
        &self,
        request: &RateRequest,
        query: &RateQuery,
    ) -> (Vec<ProviderRate>, usize, Vec<ProviderFailure>) {
        let providers = self.registry.available_providers().await;
        let providers_queried = providers.len();

        // Dropping the set aborts every task still running.
        let mut tasks = JoinSet::new();
        let mut task_providers = HashMap::with_capacity(providers.len());

        for (index, provider) in providers.into_iter().enumerate() {
            let query = query.clone();
            let limit = Duration::from_millis(
                provider
                    .timeout_ms()
                    .min(self.config.per_provider_timeout_ms),
            );
            let provider_id = provider.provider_id().clone();
            let handle = tasks.spawn(async move {
                let id = provider.provider_id().clone();
                let outcome: ProviderOutcome = match timeout(limit, provider.quote(&query)).await {
                    Ok(Ok(rates)) => Ok(rates),
                    Ok(Err(e)) => Err(ProviderFailure {
                        provider: id,
                        kind: e.kind(),
                        message: e.to_string(),
                    }),
                    Err(_) => Err(ProviderFailure {
                        provider: id,
                        kind: "timeout",
                        message: format!("no answer within {} ms", limit.as_millis()),
                    }),
                };
                (index, outcome)
            });
            task_providers.insert(handle.id(), (index, provider_id));
        }

        let mut rates = self.local_rates(request);

        let mut outcomes: Vec<(usize, ProviderOutcome)> = Vec::with_capacity(providers_queried);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    if let Some((index, provider)) = task_providers.remove(&e.id()) {
                        outcomes.push((
                            index,
                            Err(ProviderFailure {
                                provider,
                                kind: "panicked",
                                message: format!("task panicked: {e}"),
                            }),
                        ));
                    }
                }
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let mut failures = Vec::new();
        for (_, outcome) in outcomes {
            match outcome {
                Ok(provider_rates) => rates.extend(provider_rates),
                Err(failure) => {
                    tracing::warn!(
                        provider = %failure.provider,
                        kind = failure.kind,
                        lane = %query.lane_label(),
                        error = %failure.message,
                        "rate provider failed"
                    );
                    failures.push(failure);
                }
            }
        }

        (rates, providers_queried, failures)
    }

    /// The estimate and any client-submitted rates.
    fn local_rates(&self, request: &RateRequest) -> Vec<ProviderRate> {
        let mut rates = Vec::new();
        if self.config.include_estimate {
            let estimate = self.estimator.estimate(
                request.origin(),
                request.destination(),
                request.weight_kg(),
                request.service_type(),
                request.cargo_type(),
            );
            let transit = self.estimator.estimate_transit_time(
                request.origin(),
                request.destination(),
                request.service_type(),
            );
            if !estimate.distance_known {
                tracing::debug!(
                    origin = request.origin(),
                    destination = request.destination(),
                    "estimate uses default distance"
                );
            }
            rates.push(ProviderRate::Estimated(EstimatedRate {
                estimate,
                service_type: request.service_type(),
                transit_time: transit.to_string(),
            }));
        }

        for value in request.submitted_rates() {
            match LooseRate::from_value(value) {
                Some(loose) => rates.push(ProviderRate::Submitted(loose)),
                None => tracing::debug!("submitted rate is not an object, skipped"),
            }
        }
        rates
    }
}

/// Suffixes `-2`, `-3`, ... onto repeated carrier ids so a booking can name
/// exactly one rate. The first occurrence keeps its id; suffixes skip any id
/// already present in the list.
pub fn dedupe_carrier_ids(rates: &mut [CarrierRate]) {
    let mut taken: HashSet<CarrierId> = rates.iter().map(|r| r.carrier_id().clone()).collect();
    let mut seen = HashSet::with_capacity(rates.len());
    for rate in rates.iter_mut() {
        if seen.insert(rate.carrier_id().clone()) {
            continue;
        }
        let base = rate.carrier_id().as_str().to_string();
        let unique = (2u32..)
            .map(|n| CarrierId::new(format!("{base}-{n}")))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| CarrierId::new(base.clone()));
        tracing::debug!(from = %base, to = %unique, "duplicate carrier id renamed");
        taken.insert(unique.clone());
        seen.insert(unique.clone());
        rate.rename(unique);
    }
}

/// Stable ascending sort by amount, then carrier id.
pub fn sort_by_price(rates: &mut [CarrierRate]) {
    rates.sort_by(|a, b| {
        a.amount()
            .cmp(&b.amount())
            .then_with(|| a.carrier_id().cmp(b.carrier_id()))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ServiceType;
    use crate::infrastructure::rates::error::{ProviderError, ProviderResult};
    use crate::infrastructure::rates::provider_rate::{FreightosMode, FreightosModeRate};
    use crate::infrastructure::rates::registry::StaticProviderRegistry;
    use crate::infrastructure::rates::traits::RateProvider;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[derive(Debug)]
    struct MockProvider {
        id: ProviderId,
        result: ProviderResult<Vec<ProviderRate>>,
        delay_ms: u64,
        panics: bool,
    }

    impl MockProvider {
        fn quoting(id: &str, price: i64) -> Self {
            Self {
                id: ProviderId::new(id),
                result: Ok(vec![ProviderRate::FreightosMode(FreightosModeRate {
                    mode: FreightosMode::Ocean,
                    price_min: Decimal::from(price),
                    price_max: Decimal::from(price),
                    transit_min_days: 20,
                    transit_max_days: 30,
                })]),
                delay_ms: 0,
                panics: false,
            }
        }

        fn failing(id: &str) -> Self {
            Self {
                id: ProviderId::new(id),
                result: Err(ProviderError::authentication("bad key")),
                delay_ms: 0,
                panics: false,
            }
        }

        fn slow(mut self, delay_ms: u64) -> Self {
            self.delay_ms = delay_ms;
            self
        }

        fn panicking(id: &str) -> Self {
            Self {
                panics: true,
                ..Self::failing(id)
            }
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn timeout_ms(&self) -> u64 {
            1000
        }

        async fn quote(&self, _query: &RateQuery) -> ProviderResult<Vec<ProviderRate>> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            assert!(!self.panics, "provider blew up");
            self.result.clone()
        }
    }

    fn aggregator(providers: Vec<MockProvider>, config: AggregationConfig) -> RateAggregator {
        let registry = providers.into_iter().fold(StaticProviderRegistry::new(), |r, p| {
            r.with_provider(Arc::new(p))
        });
        RateAggregator::new(
            LocationResolver::default(),
            PricingEstimator::default(),
            Arc::new(registry),
            config,
        )
    }

    fn request() -> RateRequest {
        RateRequest::builder("Shanghai, China", "Rotterdam", Decimal::from(1000))
            .service_type(ServiceType::Ocean)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn estimate_survives_every_provider_failing() {
        let agg = aggregator(
            vec![MockProvider::failing("a"), MockProvider::failing("b")],
            AggregationConfig::default(),
        );
        let result = agg.aggregate(&request(), None).await.unwrap();
        assert_eq!(result.rates.len(), 1);
        assert_eq!(result.rates[0].carrier_id().as_str(), "estimate-ocean");
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.providers_responded(), 0);
        assert_eq!(result.failures[0].kind, "authentication");
    }

    #[tokio::test]
    async fn rates_are_sorted_by_price() {
        let agg = aggregator(
            vec![
                MockProvider::quoting("expensive", 900_000),
                MockProvider::quoting("cheap", 10),
            ],
            AggregationConfig::default(),
        );
        let result = agg.aggregate(&request(), None).await.unwrap();
        let amounts: Vec<Decimal> = result.rates.iter().map(CarrierRate::amount).collect();
        let mut sorted = amounts.clone();
        sorted.sort();
        assert_eq!(amounts, sorted);
        assert_eq!(result.best_rate().unwrap().amount(), Decimal::from(10));
    }

    #[tokio::test]
    async fn unknown_location_fails_fast() {
        let agg = aggregator(vec![MockProvider::quoting("a", 100)], AggregationConfig::default());
        let request = RateRequest::builder("Atlantis", "Rotterdam", Decimal::from(10))
            .build()
            .unwrap();
        let err = agg.aggregate(&request, None).await.unwrap_err();
        assert!(matches!(err, AggregationError::LocationNotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_is_cut_off() {
        let agg = aggregator(
            vec![
                MockProvider::quoting("slow", 100).slow(60_000),
                MockProvider::quoting("fast", 200),
            ],
            AggregationConfig::default().with_per_provider_timeout(500),
        );
        let result = agg.aggregate(&request(), None).await.unwrap();
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].kind, "timeout");
        assert_eq!(result.rates.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overall_timeout_discards_everything() {
        let agg = aggregator(
            vec![MockProvider::quoting("slow", 100).slow(60_000)],
            AggregationConfig::with_timeout(200).with_per_provider_timeout(10_000),
        );
        let err = agg.aggregate(&request(), None).await.unwrap_err();
        assert_eq!(err, AggregationError::Timeout);
    }

    #[tokio::test]
    async fn panicking_provider_is_isolated() {
        let agg = aggregator(
            vec![MockProvider::panicking("boom"), MockProvider::quoting("ok", 50)],
            AggregationConfig::default(),
        );
        let result = agg.aggregate(&request(), None).await.unwrap();
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].kind, "panicked");
        assert_eq!(result.failures[0].provider.as_str(), "boom");
    }

    #[tokio::test]
    async fn submitted_rates_are_normalized() {
        let agg = aggregator(vec![], AggregationConfig::default());
        let request = RateRequest::builder("Shanghai", "Rotterdam", Decimal::from(500))
            .submitted_rate(json!({"carrier": "COSCO", "totalPrice": 1})
            )
            .submitted_rate(json!("not a rate"))
            .build()
            .unwrap();
        let result = agg.aggregate(&request, None).await.unwrap();
        assert_eq!(result.rates.len(), 2);
        assert_eq!(result.rates[0].carrier_name(), "COSCO");
    }

    #[tokio::test]
    async fn repeated_carrier_ids_are_made_unique() {
        let agg = aggregator(vec![], AggregationConfig::default());
        let request = RateRequest::builder("Shanghai", "Rotterdam", Decimal::from(500))
            .submitted_rate(json!({"carrier": "COSCO", "totalPrice": 900}))
            .submitted_rate(json!({"carrier": "COSCO", "totalPrice": 1200}))
            .submitted_rate(json!({"carrierId": "estimate-ocean", "carrier": "ONE", "totalPrice": 1}))
            .service_type(ServiceType::Ocean)
            .build()
            .unwrap();
        let result = agg.aggregate(&request, None).await.unwrap();
        assert_eq!(result.rates.len(), 4);

        let mut ids: Vec<&str> = result.rates.iter().map(|r| r.carrier_id().as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["carrier-cosco", "carrier-cosco-2", "estimate-ocean", "estimate-ocean-2"]);

        let cheapest = &result.rates[0];
        assert_eq!(cheapest.carrier_name(), "ONE");
        assert_eq!(cheapest.carrier_id().as_str(), "estimate-ocean-2");
    }

    #[tokio::test]
    async fn nothing_at_all_is_rate_fetch_failed() {
        let agg = aggregator(
            vec![MockProvider::failing("only")],
            AggregationConfig::default().without_estimate(),
        );
        let err = agg.aggregate(&request(), None).await.unwrap_err();
        assert!(matches!(err, AggregationError::RateFetchFailed(ref m) if m.contains("only")));
    }

    proptest! {
        #[test]
        fn sort_is_non_decreasing(prices in proptest::collection::vec(0i64..1_000_000, 0..20)) {
            let now = Timestamp::now();
            let normalizer = RateNormalizer::default();
            let mut rates: Vec<CarrierRate> = prices
                .iter()
                .map(|p| normalizer.normalize(
                    ProviderRate::Submitted(LooseRate {
                        amount: Some(Decimal::new(*p, 2)),
                        ..LooseRate::default()
                    }),
                    now,
                ))
                .collect();
            sort_by_price(&mut rates);
            prop_assert!(rates.windows(2).all(|w| w[0].amount() <= w[1].amount()));
        }
    }
}
