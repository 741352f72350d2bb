//! # Provider Rates
//!
//! One variant per rate source, each carrying the fields that source
//! actually provides. Normalization maps every variant into a
//! [`CarrierRate`](crate::domain::entities::CarrierRate) with a total match,
//! so adding a source forces a mapping for it.
//!
//! # Examples
//!
//! ```
//! use freight_quote::infrastructure::rates::provider_rate::LooseRate;
//! use serde_json::json;
//!
//! let loose = LooseRate::from_value(&json!({
//!     "carrier": "Maersk",
//!     "totalPrice": "1450.50",
//!     "service_level": "FCL 40HC",
//! }))
//! .unwrap();
//! assert_eq!(loose.carrier_name.as_deref(), Some("Maersk"));
//! assert_eq!(loose.service_type.as_deref(), Some("FCL 40HC"));
//! ```

use crate::domain::entities::{ContractRate, LineItem, PriceBreakdown};
use crate::domain::services::Estimate;
use crate::domain::value_objects::{Currency, ServiceType, Timestamp, decimal_from_f64};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// A rate as produced by one source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRate {
    /// Synthetic estimate from the in-process pricing estimator.
    Estimated(EstimatedRate),
    /// Min/max estimate for one transport mode.
    FreightosMode(FreightosModeRate),
    /// Carrier rate from the GraphQL rate source.
    SeaRates(SeaRatesRate),
    /// Negotiated contract rate.
    Contract(ContractRate),
    /// Loosely shaped rate collected client-side.
    Submitted(LooseRate),
}

impl ProviderRate {
    /// Short label of the variant's source.
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            Self::Estimated(_) => "estimate",
            Self::FreightosMode(_) => "freightos",
            Self::SeaRates(_) => "searates",
            Self::Contract(_) => "contract",
            Self::Submitted(_) => "submitted",
        }
    }
}

/// Output of the pricing estimator for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedRate {
    /// Computed estimate.
    pub estimate: Estimate,
    /// Requested service.
    pub service_type: ServiceType,
    /// Banded transit time.
    pub transit_time: String,
}

/// Transport mode reported by the estimate API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreightosMode {
    /// Ocean freight.
    Ocean,
    /// Air freight.
    Air,
}

impl FreightosMode {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Air => "air",
        }
    }
}

/// Price and transit range for one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FreightosModeRate {
    /// Mode.
    pub mode: FreightosMode,
    /// Lowest quoted price.
    pub price_min: Decimal,
    /// Highest quoted price.
    pub price_max: Decimal,
    /// Shortest transit in days.
    pub transit_min_days: u32,
    /// Longest transit in days.
    pub transit_max_days: u32,
}

/// One carrier option from the GraphQL rate source.
#[derive(Debug, Clone, PartialEq)]
pub struct SeaRatesRate {
    /// Position in the upstream response.
    pub index: usize,
    /// Carrier name.
    pub carrier: String,
    /// Upstream shipping type label (`FCL`, `LCL`, `AIR`).
    pub shipping_type: String,
    /// Total transit in days.
    pub transit_days: Option<u32>,
    /// Total price.
    pub total: Decimal,
    /// Currency of the total.
    pub currency: Currency,
    /// Itemized tariffs.
    pub line_items: Vec<LineItem>,
    /// End of validity reported upstream.
    pub valid_to: Option<Timestamp>,
}

/// A rate record of unknown shape, read field by field with fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LooseRate {
    /// `carrierId` or `id`.
    pub carrier_id: Option<String>,
    /// `carrierName` or `carrier`.
    pub carrier_name: Option<String>,
    /// `price.amount`, `amount.total`, numeric `amount` or `totalPrice`.
    pub amount: Option<Decimal>,
    /// `price.breakdown.*` or the fields of an `amount` object.
    pub breakdown: PriceBreakdown,
    /// `price.currency` or `currency`.
    pub currency: Option<String>,
    /// `serviceType` or `service_level`.
    pub service_type: Option<String>,
    /// `transitTime` or `transit_time`.
    pub transit_time: Option<String>,
    /// `validUntil`.
    pub valid_until: Option<Timestamp>,
}

impl LooseRate {
    /// Reads a loose record. Returns `None` unless `value` is a JSON object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let price = object.get("price").filter(|p| p.is_object());
        let amount_object = object.get("amount").filter(|a| a.is_object());

        let amount = price
            .and_then(|p| p.get("amount"))
            .and_then(number)
            .or_else(|| amount_object.and_then(|a| a.get("total")).and_then(number))
            .or_else(|| object.get("amount").and_then(number))
            .or_else(|| object.get("totalPrice").and_then(number));

        let breakdown_source = price
            .and_then(|p| p.get("breakdown"))
            .filter(|b| b.is_object())
            .or(amount_object);
        let part = |key: &str| {
            breakdown_source
                .and_then(|b| b.get(key))
                .and_then(number)
                .unwrap_or(Decimal::ZERO)
        };
        let breakdown = PriceBreakdown::new(
            part("baseRate"),
            part("fuelSurcharge"),
            part("securityFee"),
            part("documentation"),
        );

        Some(Self {
            carrier_id: first_text(value, &["carrierId", "id"]),
            carrier_name: first_text(value, &["carrierName", "carrier"]),
            amount,
            breakdown,
            currency: price
                .and_then(|p| p.get("currency"))
                .and_then(text)
                .or_else(|| object.get("currency").and_then(text)),
            service_type: first_text(value, &["serviceType", "service_level"]),
            transit_time: first_text(value, &["transitTime", "transit_time"]),
            valid_until: object
                .get("validUntil")
                .and_then(Value::as_str)
                .and_then(Timestamp::parse_lenient),
        })
    }
}

/// Reads a number or a numeric string.
fn number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(decimal_from_f64)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Reads a non-blank string, or a number rendered as text.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| value.get(key).and_then(text))
}
