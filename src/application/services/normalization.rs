//! # Rate Normalization
//!
//! Maps every [`ProviderRate`] variant into the canonical [`CarrierRate`].
//!
//! Each variant has exactly one mapping function and [`RateNormalizer::normalize`]
//! matches exhaustively, so a new rate source cannot be added without a
//! mapping for it.
//!
//! ## Guarantees
//!
//! - `price.amount >= 0`
//! - without line items, the four breakdown fields sum to `price.amount`
//! - missing strings become `"Unknown carrier"` / `"unknown"`, missing
//!   numbers become zero

use crate::domain::entities::{CarrierRate, ContractRate, PriceBreakdown, RatePrice};
use crate::domain::value_objects::{CarrierId, Currency, Timestamp, percent_of, round_money};
use crate::infrastructure::rates::provider_rate::{
    EstimatedRate, FreightosMode, FreightosModeRate, LooseRate, ProviderRate, SeaRatesRate,
};
use rust_decimal::Decimal;

/// Placeholder for a missing carrier name.
pub const UNKNOWN_CARRIER: &str = "Unknown carrier";

/// Placeholder for missing service and transit strings.
pub const UNKNOWN: &str = "unknown";

/// Carrier name shown on synthetic estimates.
const ESTIMATE_CARRIER: &str = "freightcode Logistics";

/// Loose amounts above this are treated as missing.
const MAX_LOOSE_AMOUNT: i64 = 1_000_000_000_000;

/// Default estimate validity.
pub const DEFAULT_ESTIMATE_VALIDITY_HOURS: i64 = 24;

/// Validity used for external rates that do not carry one.
const EXTERNAL_VALIDITY_DAYS: i64 = 7;

/// Converts provider output into canonical rates.
#[derive(Debug, Clone, Copy)]
pub struct RateNormalizer {
    estimate_validity_hours: i64,
}

impl Default for RateNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ESTIMATE_VALIDITY_HOURS)
    }
}

impl RateNormalizer {
    /// Creates a normalizer giving estimates `estimate_validity_hours` of validity.
    #[must_use]
    pub fn new(estimate_validity_hours: i64) -> Self {
        Self {
            estimate_validity_hours: estimate_validity_hours.max(1),
        }
    }

    /// Maps one provider rate. `now` anchors every defaulted validity window.
    #[must_use]
    pub fn normalize(&self, rate: ProviderRate, now: Timestamp) -> CarrierRate {
        match rate {
            ProviderRate::Estimated(r) => self.estimated(r, now),
            ProviderRate::FreightosMode(r) => freightos(&r, now),
            ProviderRate::SeaRates(r) => searates(r, now),
            ProviderRate::Contract(r) => contract(&r),
            ProviderRate::Submitted(r) => submitted(r, now),
        }
    }

    fn estimated(&self, rate: EstimatedRate, now: Timestamp) -> CarrierRate {
        let service = rate.service_type.as_str();
        CarrierRate::new(
            CarrierId::new(format!("estimate-{service}")),
            ESTIMATE_CARRIER,
            service,
            rate.transit_time,
            RatePrice::reconciled(rate.estimate.total, Currency::usd(), rate.estimate.breakdown),
            now.add_hours(self.estimate_validity_hours),
        )
    }
}

/// Percentage split of the minimum price: base, fuel, security. Documentation
/// takes the remainder.
const fn freightos_split(mode: FreightosMode) -> (u32, u32, u32) {
    match mode {
        FreightosMode::Ocean => (80, 15, 3),
        FreightosMode::Air => (70, 20, 5),
    }
}

fn freightos(rate: &FreightosModeRate, now: Timestamp) -> CarrierRate {
    let amount = round_money(rate.price_min.max(Decimal::ZERO));
    let (base, fuel, security) = freightos_split(rate.mode);
    let base_rate = percent_of(amount, base);
    let fuel_surcharge = percent_of(amount, fuel);
    let security_fee = percent_of(amount, security);
    let documentation = amount - base_rate - fuel_surcharge - security_fee;
    let breakdown = PriceBreakdown::new(base_rate, fuel_surcharge, security_fee, documentation);

    let (name, service, validity_days) = match rate.mode {
        FreightosMode::Ocean => ("Freightos Ocean", "Standard Ocean", 7),
        FreightosMode::Air => ("Freightos Air", "Express Air", 3),
    };

    CarrierRate::new(
        CarrierId::new(format!("freightos-{}", rate.mode.as_str())),
        name,
        service,
        format!("{}-{} days", rate.transit_min_days, rate.transit_max_days),
        RatePrice::reconciled(amount, Currency::usd(), breakdown),
        now.add_days(validity_days),
    )
}

fn searates(rate: SeaRatesRate, now: Timestamp) -> CarrierRate {
    let transit = rate
        .transit_days
        .map_or_else(|| UNKNOWN.to_string(), |d| format!("{d} days"));
    CarrierRate::new(
        CarrierId::new(format!("searates-{}-{}", slug(&rate.carrier), rate.index)),
        rate.carrier,
        rate.shipping_type,
        transit,
        RatePrice::from_line_items(round_money(rate.total), rate.currency, rate.line_items),
        rate.valid_to
            .unwrap_or_else(|| now.add_days(EXTERNAL_VALIDITY_DAYS)),
    )
}

fn contract(rate: &ContractRate) -> CarrierRate {
    let breakdown = PriceBreakdown::new(
        round_money(rate.price()),
        Decimal::ZERO,
        Decimal::ZERO,
        Decimal::ZERO,
    );
    CarrierRate::new(
        CarrierId::new(format!("rate-contract-{}", rate.id())),
        rate.carrier(),
        "Contract Ocean",
        "25-30 days",
        RatePrice::from_breakdown(breakdown, rate.currency().clone()),
        rate.expires_at(),
    )
}

fn submitted(rate: LooseRate, now: Timestamp) -> CarrierRate {
    let breakdown = PriceBreakdown::new(
        sane(rate.breakdown.base_rate),
        sane(rate.breakdown.fuel_surcharge),
        sane(rate.breakdown.security_fee),
        sane(rate.breakdown.documentation),
    );
    let amount = match rate.amount.map(sane) {
        Some(amount) if amount > Decimal::ZERO => amount,
        _ => breakdown.total(),
    };

    let carrier_id = match (&rate.carrier_id, &rate.carrier_name) {
        (Some(id), _) => id.clone(),
        (None, Some(name)) => format!("carrier-{}", slug(name)),
        (None, None) => "carrier-unknown".to_string(),
    };

    CarrierRate::new(
        CarrierId::new(carrier_id),
        rate.carrier_name
            .unwrap_or_else(|| UNKNOWN_CARRIER.to_string()),
        rate.service_type.unwrap_or_else(|| UNKNOWN.to_string()),
        rate.transit_time.unwrap_or_else(|| UNKNOWN.to_string()),
        RatePrice::reconciled(
            round_money(amount),
            Currency::or_usd(rate.currency.as_deref()),
            breakdown,
        ),
        rate.valid_until
            .unwrap_or_else(|| now.add_hours(DEFAULT_ESTIMATE_VALIDITY_HOURS)),
    )
}

/// Clamps a loose value to `0..=MAX_LOOSE_AMOUNT`; out-of-range becomes zero.
fn sane(value: Decimal) -> Decimal {
    if value.is_sign_negative() || value > Decimal::from(MAX_LOOSE_AMOUNT) {
        Decimal::ZERO
    } else {
        round_money(value)
    }
}

/// Lower-case alphanumeric runs joined by `-`.
pub(crate) fn slug(text: &str) -> String {
    let slug = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}
