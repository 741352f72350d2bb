//! # SeaRates Adapter
//!
//! Queries the SeaRates GraphQL rate API.
//!
//! SeaRates addresses lanes by coordinates rather than location codes, so the
//! adapter carries its own city coordinate table. Authentication is a
//! platform token fetched from a separate endpoint and kept in a
//! [`TokenCache`]; a 401 from the GraphQL endpoint drops the cached token and
//! the call is retried once with a fresh one.
//!
//! Itemized point and route tariffs become Terminal and Freight line items.
//! When a rate carries no tariffs, a conventional five-line split of the
//! total is synthesized instead.

use crate::domain::entities::{LineItem, LineItemCategory};
use crate::domain::value_objects::{
    Currency, ProviderId, ServiceType, Timestamp, decimal_from_f64, percent_of,
};
use crate::infrastructure::rates::error::{ProviderError, ProviderResult};
use crate::infrastructure::rates::http_client::HttpClient;
use crate::infrastructure::rates::provider_rate::{ProviderRate, SeaRatesRate};
use crate::infrastructure::rates::token_cache::TokenCache;
use crate::infrastructure::rates::traits::{RateProvider, RateQuery};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// City coordinates known to the rate source, as `(name, lat, lng)`.
const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("shanghai", 31.2304, 121.4737),
    ("ningbo", 29.8683, 121.5440),
    ("shenzhen", 22.5431, 114.0579),
    ("guangzhou", 23.1291, 113.2644),
    ("hong kong", 22.3193, 114.1694),
    ("beijing", 39.9042, 116.4074),
    ("singapore", 1.3521, 103.8198),
    ("tokyo", 35.6762, 139.6503),
    ("busan", 35.1796, 129.0756),
    ("mumbai", 19.0760, 72.8777),
    ("dubai", 25.2048, 55.2708),
    ("rotterdam", 51.9244, 4.4777),
    ("antwerp", 51.2194, 4.4025),
    ("hamburg", 53.5511, 9.9937),
    ("felixstowe", 51.9615, 1.3509),
    ("london", 51.5074, -0.1278),
    ("le havre", 49.4944, 0.1079),
    ("valencia", 39.4699, -0.3763),
    ("barcelona", 41.3851, 2.1734),
    ("genoa", 44.4056, 8.9463),
    ("los angeles", 33.7490, -118.1940),
    ("long beach", 33.7701, -118.1937),
    ("new york", 40.6892, -74.0445),
    ("savannah", 32.0809, -81.0912),
    ("houston", 29.7604, -95.3698),
    ("seattle", 47.6062, -122.3321),
    ("charleston", 32.7765, -79.9311),
    ("miami", 25.7617, -80.1918),
    ("vancouver", 49.2827, -123.1207),
    ("montreal", 45.5017, -73.5673),
    ("santos", -23.9608, -46.3336),
    ("buenos aires", -34.6037, -58.3816),
    ("sydney", -33.8688, 151.2093),
    ("melbourne", -37.8136, 144.9631),
    ("auckland", -36.8485, 174.7633),
];

/// Validity assumed when the upstream gives none.
const DEFAULT_VALIDITY_DAYS: i64 = 7;

const RATES_QUERY: &str = r"
query GetRates(
  $shippingType: ShippingTypes!
  $coordinatesFrom: [Float!]!
  $coordinatesTo: [Float!]!
  $weight: Float
  $volume: Float
) {
  rates(
    shippingType: $shippingType
    coordinatesFrom: $coordinatesFrom
    coordinatesTo: $coordinatesTo
    weight: $weight
    volume: $volume
  ) {
    shipmentId
    totalPrice
    totalCurrency
    totalTransitTime
    validityTo
    queryShippingType
    points {
      provider
      pointTariff { name abbr price currency }
      routeTariff { name abbr price currency }
    }
  }
}
";

/// SeaRates adapter configuration.
#[derive(Debug, Clone)]
pub struct SeaRatesConfig {
    /// Platform id sent to the token endpoint.
    pub platform_id: String,
    /// API key sent to the token endpoint.
    pub api_key: String,
    /// Token endpoint URL.
    pub token_url: String,
    /// GraphQL endpoint URL.
    pub graphql_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Assumed token lifetime.
    pub token_lifetime: Duration,
    /// Refresh this long before the assumed expiry.
    pub token_margin: Duration,
}

impl SeaRatesConfig {
    /// Creates a configuration with the public endpoints, a 9 hour token
    /// lifetime and a 5 minute margin.
    #[must_use]
    pub fn new(platform_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            platform_id: platform_id.into(),
            api_key: api_key.into(),
            token_url: "https://www.searates.com/auth/platform-token".to_string(),
            graphql_url: "https://rates.searates.com/graphql".to_string(),
            timeout_ms: 8000,
            token_lifetime: Duration::from_secs(9 * 60 * 60),
            token_margin: Duration::from_secs(5 * 60),
        }
    }

    /// Overrides both endpoint URLs.
    #[must_use]
    pub fn with_endpoints(mut self, token_url: impl Into<String>, graphql_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.graphql_url = graphql_url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "s-token")]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables {
    shipping_type: &'static str,
    coordinates_from: [f64; 2],
    coordinates_to: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<f64>,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a Variables,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<RatesData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct RatesData {
    rates: Option<Vec<RateNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateNode {
    total_price: Option<f64>,
    total_currency: Option<String>,
    total_transit_time: Option<f64>,
    validity_to: Option<String>,
    query_shipping_type: Option<String>,
    points: Option<Vec<PointNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointNode {
    provider: Option<String>,
    point_tariff: Option<Vec<TariffNode>>,
    route_tariff: Option<Vec<TariffNode>>,
}

#[derive(Debug, Deserialize)]
struct TariffNode {
    name: Option<String>,
    abbr: Option<String>,
    price: Option<f64>,
    currency: Option<String>,
}

/// Looks up coordinates for a city name.
///
/// Exact match on the trimmed lower-case name first, then the first entry
/// where either string contains the other.
#[must_use]
pub fn city_coordinates(name: &str) -> Option<[f64; 2]> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    CITY_COORDINATES
        .iter()
        .find(|(key, _, _)| *key == normalized)
        .or_else(|| {
            CITY_COORDINATES
                .iter()
                .find(|(key, _, _)| normalized.contains(key) || key.contains(normalized.as_str()))
        })
        .map(|(_, lat, lng)| [*lat, *lng])
}

/// SeaRates GraphQL adapter.
#[derive(Debug)]
pub struct SeaRatesAdapter {
    id: ProviderId,
    config: SeaRatesConfig,
    http: HttpClient,
    tokens: Arc<TokenCache>,
}

impl SeaRatesAdapter {
    /// Creates the adapter with its own token cache.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the HTTP client cannot be built.
    pub fn new(config: SeaRatesConfig) -> ProviderResult<Self> {
        let tokens = Arc::new(TokenCache::new(config.token_lifetime, config.token_margin));
        Self::with_token_cache(config, tokens)
    }

    /// Creates the adapter around an existing token cache.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the HTTP client cannot be built.
    pub fn with_token_cache(config: SeaRatesConfig, tokens: Arc<TokenCache>) -> ProviderResult<Self> {
        let http = HttpClient::new(config.timeout_ms)?;
        Ok(Self {
            id: ProviderId::new("searates"),
            config,
            http,
            tokens,
        })
    }

    async fn fetch_token(&self) -> ProviderResult<String> {
        let params = [
            ("id", self.config.platform_id.as_str()),
            ("api_key", self.config.api_key.as_str()),
        ];
        let response: TokenResponse = self
            .http
            .get_with_params(&self.config.token_url, &params)
            .await
            .map_err(|e| match e {
                ProviderError::Schema { message } | ProviderError::InvalidRequest { message } => {
                    ProviderError::authentication(format!("token exchange failed: {message}"))
                }
                other => other,
            })?;
        response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::authentication("token response carried no s-token"))
    }

    async fn token(&self) -> ProviderResult<String> {
        self.tokens.get_or_refresh(|| self.fetch_token()).await
    }

    async fn post_query(&self, token: &str, variables: &Variables) -> ProviderResult<GraphQlResponse> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ProviderError::authentication("token is not a valid header value"))?;
        headers.insert(AUTHORIZATION, bearer);
        let request = GraphQlRequest {
            query: RATES_QUERY,
            variables,
        };
        self.http
            .post_with_headers(&self.config.graphql_url, &request, headers)
            .await
    }

    fn variables(query: &RateQuery, from: [f64; 2], to: [f64; 2]) -> ProviderResult<Variables> {
        let shipping_type = match query.service_type {
            ServiceType::Ocean => "FCL",
            ServiceType::Air | ServiceType::Express => "AIR",
            ServiceType::Road => return Err(ProviderError::unsupported_mode("road")),
        };
        Ok(Variables {
            shipping_type,
            coordinates_from: from,
            coordinates_to: to,
            weight: query.weight_kg.to_f64().filter(|w| *w > 0.0),
            volume: query.volume_cbm.and_then(|v| v.to_f64()).filter(|v| *v > 0.0),
        })
    }

    fn to_rate(query: &RateQuery, index: usize, node: RateNode) -> Option<SeaRatesRate> {
        let total = node.total_price.and_then(decimal_from_f64)?;
        if total < Decimal::ZERO {
            return None;
        }
        let currency = Currency::or_usd(node.total_currency.as_deref());
        let points = node.points.unwrap_or_default();
        let carrier = points
            .iter()
            .find_map(|p| p.provider.clone().filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| "SeaRates Carrier".to_string());

        let mut line_items = Vec::new();
        for point in points {
            for tariff in point.point_tariff.unwrap_or_default() {
                if let Some(item) = tariff_line(LineItemCategory::Terminal, tariff, &currency) {
                    line_items.push(item);
                }
            }
            for tariff in point.route_tariff.unwrap_or_default() {
                if let Some(item) = tariff_line(LineItemCategory::Freight, tariff, &currency) {
                    line_items.push(item);
                }
            }
        }
        if line_items.is_empty() {
            line_items = fallback_lines(query, total, &currency);
        }

        let shipping_type = node
            .query_shipping_type
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| match query.service_type {
                ServiceType::Air | ServiceType::Express => "Air Freight".to_string(),
                _ => "Ocean Freight".to_string(),
            });

        Some(SeaRatesRate {
            index,
            carrier,
            shipping_type,
            transit_days: node
                .total_transit_time
                .filter(|d| d.is_finite() && *d >= 0.0)
                .and_then(|d| d.round().to_u32()),
            total,
            currency,
            line_items,
            valid_to: node
                .validity_to
                .as_deref()
                .and_then(Timestamp::parse_lenient)
                .or_else(|| Some(Timestamp::now().add_days(DEFAULT_VALIDITY_DAYS))),
        })
    }
}

fn tariff_line(category: LineItemCategory, tariff: TariffNode, fallback: &Currency) -> Option<LineItem> {
    let price = tariff.price.and_then(decimal_from_f64)?;
    let description = tariff
        .name
        .filter(|s| !s.trim().is_empty())
        .or(tariff.abbr)
        .unwrap_or_else(|| category.to_string());
    let currency = tariff
        .currency
        .and_then(|c| Currency::new(c).ok())
        .unwrap_or_else(|| fallback.clone());
    Some(LineItem::flat(category, description, "shipment", price, currency))
}

/// Five-line split used when the upstream gives only a total.
fn fallback_lines(query: &RateQuery, total: Decimal, currency: &Currency) -> Vec<LineItem> {
    let freight = percent_of(total, 65);
    let surcharge = percent_of(total, 15);
    let origin_thc = percent_of(total, 8);
    let destination_thc = percent_of(total, 7);
    let documentation = total - freight - surcharge - origin_thc - destination_thc;
    vec![
        LineItem::flat(
            LineItemCategory::Freight,
            format!("Ocean Freight ({} -> {})", query.origin_name, query.destination_name),
            "shipment",
            freight,
            currency.clone(),
        ),
        LineItem::flat(
            LineItemCategory::Surcharges,
            "Bunker Adjustment Factor (BAF)",
            "shipment",
            surcharge,
            currency.clone(),
        ),
        LineItem::flat(
            LineItemCategory::Terminal,
            "Terminal Handling Origin",
            "shipment",
            origin_thc,
            currency.clone(),
        ),
        LineItem::flat(
            LineItemCategory::Terminal,
            "Terminal Handling Destination",
            "shipment",
            destination_thc,
            currency.clone(),
        ),
        LineItem::flat(
            LineItemCategory::Documentation,
            "Documentation Fee",
            "shipment",
            documentation,
            currency.clone(),
        ),
    ]
}

#[async_trait]
impl RateProvider for SeaRatesAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    async fn quote(&self, query: &RateQuery) -> ProviderResult<Vec<ProviderRate>> {
        let (Some(from), Some(to)) = (
            city_coordinates(&query.origin_name),
            city_coordinates(&query.destination_name),
        ) else {
            return Err(ProviderError::no_rate_for_lane(format!(
                "no coordinates for {} -> {}",
                query.origin_name, query.destination_name
            )));
        };

        let variables = Self::variables(query, from, to)?;

        let token = self.token().await?;
        let response = match self.post_query(&token, &variables).await {
            Err(ProviderError::Authentication { message }) => {
                tracing::info!(error = %message, "searates token rejected, refreshing");
                self.tokens.invalidate().await;
                let token = self.token().await?;
                self.post_query(&token, &variables).await?
            }
            other => other?,
        };

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors
                .into_iter()
                .map(|e| e.message.unwrap_or_else(|| "unknown error".to_string()))
                .collect();
            return Err(ProviderError::schema(format!("graphql errors: {}", messages.join("; "))));
        }

        let nodes = response.data.and_then(|d| d.rates).unwrap_or_default();
        let rates: Vec<ProviderRate> = nodes
            .into_iter()
            .enumerate()
            .filter_map(|(index, node)| Self::to_rate(query, index, node))
            .map(ProviderRate::SeaRates)
            .collect();

        if rates.is_empty() {
            return Err(ProviderError::no_rate_for_lane(format!(
                "no rates for {}",
                query.lane_label()
            )));
        }
        tracing::debug!(lane = %query.lane_label(), count = rates.len(), "searates rates received");
        Ok(rates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::LocationCode;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(service_type: ServiceType) -> RateQuery {
        RateQuery {
            origin: LocationCode::new("CNSHA").unwrap(),
            destination: LocationCode::new("NLRTM").unwrap(),
            origin_name: "Shanghai, China".to_string(),
            destination_name: "Rotterdam".to_string(),
            weight_kg: Decimal::from(1200),
            volume_cbm: None,
            service_type,
            organization: None,
        }
    }

    fn adapter(server: &MockServer) -> SeaRatesAdapter {
        let config = SeaRatesConfig::new("38163", "k-1").with_endpoints(
            format!("{}/auth/platform-token", server.uri()),
            format!("{}/graphql", server.uri()),
        );
        SeaRatesAdapter::new(config).unwrap()
    }

    async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/auth/platform-token"))
            .and(query_param("id", "38163"))
            .and(query_param("api_key", "k-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"s-token": token})))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn coordinates_lookup() {
        assert_eq!(city_coordinates("Shanghai, China"), Some([31.2304, 121.4737]));
        assert_eq!(city_coordinates("LONDON"), Some([51.5074, -0.1278]));
        assert!(city_coordinates("Atlantis").is_none());
        assert!(city_coordinates(" ").is_none());
    }

    #[tokio::test]
    async fn tariffs_become_line_items() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"rates": [{
                    "totalPrice": 1800,
                    "totalCurrency": "USD",
                    "totalTransitTime": 31,
                    "validityTo": "2099-01-31",
                    "queryShippingType": "FCL",
                    "points": [
                        {"provider": null, "pointTariff": [{"name": "THC", "abbr": "THC", "price": 300, "currency": "USD"}], "routeTariff": []},
                        {"provider": "MSC", "pointTariff": [], "routeTariff": [{"name": "Ocean freight", "abbr": "OF", "price": 1500, "currency": null}]}
                    ]
                }]}
            })))
            .mount(&server)
            .await;

        let rates = adapter(&server).quote(&query(ServiceType::Ocean)).await.unwrap();
        assert_eq!(rates.len(), 1);
        let ProviderRate::SeaRates(rate) = &rates[0] else {
            unreachable!("expected a searates rate");
        };
        assert_eq!(rate.carrier, "MSC");
        assert_eq!(rate.transit_days, Some(31));
        assert_eq!(rate.line_items.len(), 2);
        assert_eq!(rate.line_items[0].category, LineItemCategory::Terminal);
        assert_eq!(rate.line_items[1].category, LineItemCategory::Freight);
    }

    #[tokio::test]
    async fn total_only_gets_five_line_split() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"rates": [{"totalPrice": 1000.0, "points": []}]}
            })))
            .mount(&server)
            .await;

        let rates = adapter(&server).quote(&query(ServiceType::Ocean)).await.unwrap();
        let ProviderRate::SeaRates(rate) = &rates[0] else {
            unreachable!("expected a searates rate");
        };
        let totals: Vec<Decimal> = rate.line_items.iter().map(|l| l.total).collect();
        assert_eq!(
            totals,
            vec![
                Decimal::from(650),
                Decimal::from(150),
                Decimal::from(80),
                Decimal::from(70),
                Decimal::from(50)
            ]
        );
        assert_eq!(rate.carrier, "SeaRates Carrier");
        assert!(rate.valid_to.is_some());
    }

    #[tokio::test]
    async fn token_is_cached_across_calls() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"rates": [{"totalPrice": 900, "points": []}]}
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        adapter.quote(&query(ServiceType::Ocean)).await.unwrap();
        adapter.quote(&query(ServiceType::Air)).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_once() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 2).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"rates": [{"totalPrice": 900, "points": []}]}
            })))
            .mount(&server)
            .await;

        let rates = adapter(&server).quote(&query(ServiceType::Ocean)).await.unwrap();
        assert_eq!(rates.len(), 1);
    }

    #[tokio::test]
    async fn graphql_errors_are_schema_errors() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Cannot query field \"foo\""}]
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).quote(&query(ServiceType::Ocean)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Schema { .. }));
    }

    #[tokio::test]
    async fn road_is_unsupported() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 0).await;
        let err = adapter(&server).quote(&query(ServiceType::Road)).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedMode { .. }));
    }

    #[tokio::test]
    async fn unknown_city_is_no_rate_for_lane() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 0).await;
        let mut q = query(ServiceType::Ocean);
        q.destination_name = "Atlantis".to_string();
        let err = adapter(&server).quote(&q).await.unwrap_err();
        assert!(err.is_business());
    }
}
