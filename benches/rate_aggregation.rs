//! Aggregation throughput with the estimator plus stub providers.

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use freight_quote::application::services::{AggregationConfig, RateAggregator};
use freight_quote::domain::entities::RateRequest;
use freight_quote::domain::services::{LocationResolver, PricingEstimator};
use freight_quote::domain::value_objects::{Currency, ProviderId, ServiceType, Timestamp};
use freight_quote::infrastructure::rates::{
    FreightosMode, FreightosModeRate, ProviderRate, ProviderResult, RateProvider, RateQuery,
    SeaRatesRate, StaticProviderRegistry,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Debug)]
struct StubProvider {
    id: ProviderId,
    rates: Vec<ProviderRate>,
}

impl StubProvider {
    fn new(n: usize) -> Self {
        let mut rates = vec![ProviderRate::FreightosMode(FreightosModeRate {
            mode: FreightosMode::Ocean,
            price_min: Decimal::from(1200 + n as i64),
            price_max: Decimal::from(1800 + n as i64),
            transit_min_days: 20,
            transit_max_days: 30,
        })];
        rates.extend((0..8).map(|index| {
            ProviderRate::SeaRates(SeaRatesRate {
                index,
                carrier: format!("Carrier {n}-{index}"),
                shipping_type: "FCL".to_string(),
                transit_days: Some(25),
                total: Decimal::from(900 + (index as i64 * 37) % 500),
                currency: Currency::usd(),
                line_items: Vec::new(),
                valid_to: Some(Timestamp::now().add_days(7)),
            })
        }));
        Self {
            id: ProviderId::new(format!("stub-{n}")),
            rates,
        }
    }
}

#[async_trait]
impl RateProvider for StubProvider {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn timeout_ms(&self) -> u64 {
        1000
    }

    async fn quote(&self, _query: &RateQuery) -> ProviderResult<Vec<ProviderRate>> {
        Ok(self.rates.clone())
    }
}

fn aggregator(providers: usize) -> RateAggregator {
    let registry = (0..providers).fold(StaticProviderRegistry::new(), |registry, n| {
        registry.with_provider(Arc::new(StubProvider::new(n)))
    });
    RateAggregator::new(
        LocationResolver::default(),
        PricingEstimator::default(),
        Arc::new(registry),
        AggregationConfig::default(),
    )
}

fn bench_aggregate(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let request = RateRequest::builder("Shanghai, China", "Rotterdam", Decimal::from(1500))
        .service_type(ServiceType::Ocean)
        .build()
        .expect("request");

    let mut group = c.benchmark_group("aggregate");
    for providers in [0usize, 2, 8] {
        let agg = aggregator(providers);
        group.bench_with_input(BenchmarkId::from_parameter(providers), &providers, |b, _| {
            b.to_async(&rt)
                .iter(|| async { agg.aggregate(&request, None).await.expect("rates") });
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let resolver = LocationResolver::default();
    c.bench_function("resolve_location", |b| {
        b.iter(|| resolver.resolve(std::hint::black_box("Port of Shanghai, China")))
    });
}

criterion_group!(benches, bench_aggregate, bench_resolve);
criterion_main!(benches);
