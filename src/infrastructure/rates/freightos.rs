//! # Freightos Adapter
//!
//! Queries the Freightos freight-estimate API for min/max price and transit
//! ranges per transport mode.
//!
//! The API is keyed by UN/LOCODE and answers with an object holding an
//! optional `OCEAN` and `AIR` entry. Every mode that carries both a price and
//! a transit range becomes one [`FreightosModeRate`].

use crate::domain::value_objects::{ProviderId, decimal_from_f64};
use crate::infrastructure::rates::error::{ProviderError, ProviderResult};
use crate::infrastructure::rates::http_client::HttpClient;
use crate::infrastructure::rates::provider_rate::{FreightosMode, FreightosModeRate, ProviderRate};
use crate::infrastructure::rates::traits::{RateProvider, RateQuery};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Estimate endpoint path under the base URL.
const ESTIMATES_PATH: &str = "/api/v1/freightEstimates";

/// Volume assumed per kilogram when the request has none.
const CBM_PER_KG: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Freightos adapter configuration.
#[derive(Debug, Clone)]
pub struct FreightosConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Value of the `x-apikey` header.
    pub api_key: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl FreightosConfig {
    /// Creates a configuration with the default 5 second timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_ms: 5000,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadUnit {
    quantity: u32,
    unit_type: &'static str,
    unit_weight_kg: f64,
    #[serde(rename = "unitVolumeCBM")]
    unit_volume_cbm: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationRef {
    un_location_code: String,
}

#[derive(Debug, Serialize)]
struct Leg {
    origin: LocationRef,
    destination: LocationRef,
}

#[derive(Debug, Serialize)]
struct EstimateRequest {
    load: Vec<LoadUnit>,
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Range {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeResponse {
    price_estimates: Option<Range>,
    transit_time: Option<Range>,
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    #[serde(rename = "OCEAN")]
    ocean: Option<ModeResponse>,
    #[serde(rename = "AIR")]
    air: Option<ModeResponse>,
}

/// Freightos estimate adapter.
#[derive(Debug)]
pub struct FreightosAdapter {
    id: ProviderId,
    config: FreightosConfig,
    http: HttpClient,
}

impl FreightosAdapter {
    /// Creates the adapter.
    ///
    /// # Errors
    ///
    /// - `ProviderError::InvalidRequest` if the API key is not a valid header value
    /// - `ProviderError::Internal` if the HTTP client cannot be built
    pub fn new(config: FreightosConfig) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ProviderError::invalid_request("api key is not a valid header value"))?;
        headers.insert("x-apikey", key);
        let http = HttpClient::with_headers(config.timeout_ms, headers)?;
        Ok(Self {
            id: ProviderId::new("freightos"),
            config,
            http,
        })
    }

    fn request_body(query: &RateQuery) -> EstimateRequest {
        let volume = query
            .volume_cbm
            .unwrap_or(query.weight_kg * CBM_PER_KG);
        EstimateRequest {
            load: vec![LoadUnit {
                quantity: 1,
                unit_type: "boxes",
                unit_weight_kg: query.weight_kg.to_f64().unwrap_or(0.0),
                unit_volume_cbm: volume.to_f64().unwrap_or(0.0),
            }],
            legs: vec![Leg {
                origin: LocationRef {
                    un_location_code: query.origin.as_str().to_string(),
                },
                destination: LocationRef {
                    un_location_code: query.destination.as_str().to_string(),
                },
            }],
        }
    }
}

fn mode_rate(mode: FreightosMode, response: Option<ModeResponse>) -> Option<FreightosModeRate> {
    let response = response?;
    let price = response.price_estimates?;
    let transit = response.transit_time?;
    let price_min = decimal_from_f64(price.min)?;
    let price_max = decimal_from_f64(price.max).unwrap_or(price_min);
    if price_min < Decimal::ZERO {
        return None;
    }
    Some(FreightosModeRate {
        mode,
        price_min,
        price_max,
        transit_min_days: days(transit.min),
        transit_max_days: days(transit.max),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn days(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[async_trait]
impl RateProvider for FreightosAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    async fn quote(&self, query: &RateQuery) -> ProviderResult<Vec<ProviderRate>> {
        let url = format!("{}{}", self.config.base_url, ESTIMATES_PATH);
        let body = Self::request_body(query);
        let response: EstimateResponse = self
            .http
            .post_with_headers(&url, &body, HeaderMap::new())
            .await?;

        let rates: Vec<ProviderRate> = [
            mode_rate(FreightosMode::Ocean, response.ocean),
            mode_rate(FreightosMode::Air, response.air),
        ]
        .into_iter()
        .flatten()
        .map(ProviderRate::FreightosMode)
        .collect();

        if rates.is_empty() {
            return Err(ProviderError::no_rate_for_lane(format!(
                "no mode estimates for {}",
                query.lane_label()
            )));
        }
        tracing::debug!(lane = %query.lane_label(), count = rates.len(), "freightos estimates received");
        Ok(rates)
    }
}
