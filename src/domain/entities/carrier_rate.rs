//! # Carrier Rate
//!
//! The canonical, normalized rate every source is mapped into.
//!
//! A [`CarrierRate`] carries a [`RatePrice`] whose [`PriceBreakdown`] always
//! sums exactly to `amount`, less any "Additional Services" lines added at
//! booking time. Other itemized [`LineItem`]s are detail and never a second
//! total. The invariant also holds for deserialized prices.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::entities::carrier_rate::{CarrierRate, PriceBreakdown, RatePrice};
//! use freight_quote::domain::value_objects::{CarrierId, Currency, Timestamp};
//! use rust_decimal::Decimal;
//!
//! let price = RatePrice::reconciled(
//!     Decimal::from(1000),
//!     Currency::usd(),
//!     PriceBreakdown::new(Decimal::ZERO, Decimal::from(150), Decimal::from(25), Decimal::from(15)),
//! );
//! assert_eq!(price.breakdown().base_rate, Decimal::from(810));
//!
//! let rate = CarrierRate::new(
//!     CarrierId::new("estimate-ocean"),
//!     "Estimated Rate",
//!     "ocean",
//!     "14-21 days",
//!     price,
//!     Timestamp::now().add_hours(24),
//! );
//! assert!(!rate.is_expired());
//! ```

use crate::domain::value_objects::{CarrierId, Currency, Timestamp, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed four-way split of a rate's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Line-haul component.
    pub base_rate: Decimal,
    /// Fuel / bunker surcharge.
    pub fuel_surcharge: Decimal,
    /// Security fee.
    pub security_fee: Decimal,
    /// Documentation fee.
    pub documentation: Decimal,
}

impl PriceBreakdown {
    /// Creates a breakdown from its four components.
    #[must_use]
    pub const fn new(
        base_rate: Decimal,
        fuel_surcharge: Decimal,
        security_fee: Decimal,
        documentation: Decimal,
    ) -> Self {
        Self {
            base_rate,
            fuel_surcharge,
            security_fee,
            documentation,
        }
    }

    /// Sum of all four components.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.base_rate + self.fuel_surcharge + self.security_fee + self.documentation
    }

    /// Sum of the three surcharges.
    #[must_use]
    pub fn surcharges(&self) -> Decimal {
        self.fuel_surcharge + self.security_fee + self.documentation
    }

    /// Fits the breakdown to `amount` so that [`total`](Self::total) equals it.
    ///
    /// Negative components are clamped to zero. When the surcharges alone
    /// exceed `amount`, the whole amount becomes the base rate; otherwise the
    /// base rate absorbs the difference.
    ///
    /// # Examples
    ///
    /// ```
    /// use freight_quote::domain::entities::carrier_rate::PriceBreakdown;
    /// use rust_decimal::Decimal;
    ///
    /// let b = PriceBreakdown::new(Decimal::ZERO, Decimal::from(80), Decimal::from(30), Decimal::ZERO)
    ///     .reconcile(Decimal::from(100));
    /// assert_eq!(b.base_rate, Decimal::from(100));
    /// assert_eq!(b.total(), Decimal::from(100));
    /// ```
    #[must_use]
    pub fn reconcile(self, amount: Decimal) -> Self {
        let amount = amount.max(Decimal::ZERO);
        let fuel_surcharge = self.fuel_surcharge.max(Decimal::ZERO);
        let security_fee = self.security_fee.max(Decimal::ZERO);
        let documentation = self.documentation.max(Decimal::ZERO);
        let surcharges = fuel_surcharge + security_fee + documentation;

        if surcharges > amount {
            return Self::new(amount, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        }
        Self::new(amount - surcharges, fuel_surcharge, security_fee, documentation)
    }
}

/// Category of an itemized tariff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineItemCategory {
    /// Main carriage.
    Freight,
    /// Origin or destination terminal handling.
    Terminal,
    /// Bunker and other surcharges.
    Surcharges,
    /// Paperwork.
    Documentation,
    /// Extras added at booking time.
    #[serde(rename = "Additional Services")]
    AdditionalServices,
}

impl fmt::Display for LineItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Freight => write!(f, "Freight"),
            Self::Terminal => write!(f, "Terminal"),
            Self::Surcharges => write!(f, "Surcharges"),
            Self::Documentation => write!(f, "Documentation"),
            Self::AdditionalServices => write!(f, "Additional Services"),
        }
    }
}

/// One itemized tariff line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Grouping category.
    pub category: LineItemCategory,
    /// Human description.
    pub description: String,
    /// Charging unit (`shipment`, `container`, `unit`, ...).
    pub unit: String,
    /// Unit price.
    pub price: Decimal,
    /// Line currency.
    pub currency: Currency,
    /// Minimum charge, if the tariff defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Decimal>,
    /// Line total.
    pub total: Decimal,
    /// VAT marker, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<String>,
}

impl LineItem {
    /// Creates a flat line where price equals total.
    #[must_use]
    pub fn flat(
        category: LineItemCategory,
        description: impl Into<String>,
        unit: impl Into<String>,
        total: Decimal,
        currency: Currency,
    ) -> Self {
        let total = round_money(total);
        Self {
            category,
            description: description.into(),
            unit: unit.into(),
            price: total,
            currency,
            minimum: None,
            total,
            vat: None,
        }
    }
}

/// Price of a rate: total, currency, breakdown and optional line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RatePriceRecord")]
pub struct RatePrice {
    amount: Decimal,
    currency: Currency,
    breakdown: PriceBreakdown,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    line_items: Vec<LineItem>,
}

/// Stored form of a [`RatePrice`], fitted on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatePriceRecord {
    amount: Decimal,
    currency: Currency,
    #[serde(default)]
    breakdown: PriceBreakdown,
    #[serde(default)]
    line_items: Vec<LineItem>,
}

impl From<RatePriceRecord> for RatePrice {
    fn from(record: RatePriceRecord) -> Self {
        let extras = additional_services_total(&record.line_items);
        let amount = record.amount.max(extras);
        Self {
            amount,
            currency: record.currency,
            breakdown: record.breakdown.reconcile(amount - extras),
            line_items: record.line_items,
        }
    }
}

fn additional_services_total(line_items: &[LineItem]) -> Decimal {
    line_items
        .iter()
        .filter(|item| item.category == LineItemCategory::AdditionalServices)
        .map(|item| item.total.max(Decimal::ZERO))
        .sum()
}

impl RatePrice {
    /// Price whose amount is the breakdown total.
    #[must_use]
    pub fn from_breakdown(breakdown: PriceBreakdown, currency: Currency) -> Self {
        let breakdown = breakdown.reconcile(breakdown.total());
        Self {
            amount: breakdown.total(),
            currency,
            breakdown,
            line_items: Vec::new(),
        }
    }

    /// Price with a known total; the breakdown is fitted to it.
    ///
    /// A negative amount is clamped to zero.
    #[must_use]
    pub fn reconciled(amount: Decimal, currency: Currency, breakdown: PriceBreakdown) -> Self {
        let amount = amount.max(Decimal::ZERO);
        Self {
            amount,
            currency,
            breakdown: breakdown.reconcile(amount),
            line_items: Vec::new(),
        }
    }

    /// Price derived from itemized lines.
    ///
    /// Freight and Terminal lines roll into the base rate, Surcharges into
    /// fuel, Documentation into documentation. The breakdown is then fitted to
    /// `amount`.
    #[must_use]
    pub fn from_line_items(amount: Decimal, currency: Currency, line_items: Vec<LineItem>) -> Self {
        let mut breakdown = PriceBreakdown::default();
        for item in &line_items {
            match item.category {
                LineItemCategory::Freight | LineItemCategory::Terminal => {
                    breakdown.base_rate += item.total;
                }
                LineItemCategory::Surcharges => breakdown.fuel_surcharge += item.total,
                LineItemCategory::Documentation => breakdown.documentation += item.total,
                LineItemCategory::AdditionalServices => {}
            }
        }
        let mut price = Self::reconciled(amount, currency, breakdown);
        price.line_items = line_items;
        price
    }

    /// Appends extra charges as "Additional Services" lines and adds them to
    /// the amount.
    #[must_use]
    pub fn with_additional_fees<'a, I>(mut self, fees: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        for (description, amount) in fees {
            let amount = round_money(amount.max(Decimal::ZERO));
            self.amount += amount;
            self.line_items.push(LineItem::flat(
                LineItemCategory::AdditionalServices,
                description,
                "unit",
                amount,
                self.currency.clone(),
            ));
        }
        self
    }

    /// Total amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Four-way breakdown.
    #[inline]
    #[must_use]
    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    /// Itemized lines; empty when the source provided none.
    #[inline]
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }
}

/// A normalized carrier rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierRate {
    carrier_id: CarrierId,
    carrier_name: String,
    service_type: String,
    transit_time: String,
    price: RatePrice,
    valid_until: Timestamp,
}

impl CarrierRate {
    /// Creates a carrier rate.
    #[must_use]
    pub fn new(
        carrier_id: CarrierId,
        carrier_name: impl Into<String>,
        service_type: impl Into<String>,
        transit_time: impl Into<String>,
        price: RatePrice,
        valid_until: Timestamp,
    ) -> Self {
        Self {
            carrier_id,
            carrier_name: carrier_name.into(),
            service_type: service_type.into(),
            transit_time: transit_time.into(),
            price,
            valid_until,
        }
    }

    /// Source-unique carrier identifier.
    #[inline]
    #[must_use]
    pub fn carrier_id(&self) -> &CarrierId {
        &self.carrier_id
    }

    /// Replaces the carrier id. Used to keep ids unique within a quote.
    pub(crate) fn rename(&mut self, carrier_id: CarrierId) {
        self.carrier_id = carrier_id;
    }

    /// Display name of the carrier.
    #[inline]
    #[must_use]
    pub fn carrier_name(&self) -> &str {
        &self.carrier_name
    }

    /// Service description.
    #[inline]
    #[must_use]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Transit range such as `14-21 days`. Not a number.
    #[inline]
    #[must_use]
    pub fn transit_time(&self) -> &str {
        &self.transit_time
    }

    /// Price.
    #[inline]
    #[must_use]
    pub fn price(&self) -> &RatePrice {
        &self.price
    }

    /// Total amount, shorthand for `price().amount()`.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.price.amount
    }

    /// End of the validity window.
    #[inline]
    #[must_use]
    pub fn valid_until(&self) -> Timestamp {
        self.valid_until
    }

    /// Returns true once the validity window has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.valid_until.is_expired()
    }
}

impl fmt::Display for CarrierRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {}",
            self.carrier_name, self.carrier_id, self.price.amount, self.price.currency
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn reconcile_base_absorbs_difference() {
        let b = PriceBreakdown::new(d(0), d(100), d(25), d(15)).reconcile(d(1000));
        assert_eq!(b.base_rate, d(860));
        assert_eq!(b.total(), d(1000));
    }

    #[test]
    fn reconcile_surcharges_exceeding_amount() {
        let b = PriceBreakdown::new(d(5), d(60), d(30), d(20)).reconcile(d(100));
        assert_eq!(b, PriceBreakdown::new(d(100), d(0), d(0), d(0)));
    }

    #[test]
    fn reconcile_clamps_negatives() {
        let b = PriceBreakdown::new(d(0), d(-10), d(25), d(0)).reconcile(d(-5));
        assert_eq!(b.total(), d(0));
        assert!(b.fuel_surcharge >= Decimal::ZERO);
    }

    #[test]
    fn from_line_items_groups_categories() {
        let usd = Currency::usd();
        let items = vec![
            LineItem::flat(LineItemCategory::Freight, "Ocean freight", "container", d(650), usd.clone()),
            LineItem::flat(LineItemCategory::Surcharges, "BAF", "container", d(150), usd.clone()),
            LineItem::flat(LineItemCategory::Terminal, "THC origin", "container", d(80), usd.clone()),
            LineItem::flat(LineItemCategory::Terminal, "THC destination", "container", d(70), usd.clone()),
            LineItem::flat(LineItemCategory::Documentation, "B/L fee", "shipment", d(50), usd.clone()),
        ];
        let price = RatePrice::from_line_items(d(1000), usd, items);
        assert_eq!(price.breakdown().base_rate, d(800));
        assert_eq!(price.breakdown().fuel_surcharge, d(150));
        assert_eq!(price.breakdown().documentation, d(50));
        assert_eq!(price.breakdown().total(), price.amount());
        assert_eq!(price.line_items().len(), 5);
    }

    #[test]
    fn additional_fees_extend_amount_and_lines() {
        let price = RatePrice::from_breakdown(
            PriceBreakdown::new(d(500), d(75), d(25), d(15)),
            Currency::new("GBP").unwrap(),
        )
        .with_additional_fees([("Insurance", d(40)), ("Tail lift", d(10))]);
        assert_eq!(price.amount(), d(665));
        assert_eq!(price.line_items().len(), 2);
        assert_eq!(
            price.line_items()[0].category,
            LineItemCategory::AdditionalServices
        );
        assert_eq!(price.line_items()[0].currency.as_str(), "GBP");
    }

    #[test]
    fn deserialized_price_is_reconciled() {
        let price: RatePrice = serde_json::from_value(serde_json::json!({
            "amount": "1000",
            "currency": "USD",
            "breakdown": {
                "baseRate": "10",
                "fuelSurcharge": "150",
                "securityFee": "-20",
                "documentation": "40"
            }
        }))
        .unwrap();
        assert_eq!(price.breakdown().total(), price.amount());
        assert_eq!(price.breakdown().base_rate, d(810));
        assert_eq!(price.breakdown().security_fee, d(0));

        let bare: RatePrice =
            serde_json::from_value(serde_json::json!({"amount": "75", "currency": "EUR"})).unwrap();
        assert_eq!(bare.breakdown().base_rate, d(75));
    }

    #[test]
    fn deserialized_rate_cannot_carry_a_mismatched_breakdown() {
        let rate: CarrierRate = serde_json::from_value(serde_json::json!({
            "carrierId": "carrier-cosco",
            "carrierName": "COSCO",
            "serviceType": "FCL",
            "transitTime": "30 days",
            "price": {
                "amount": "500",
                "currency": "USD",
                "breakdown": {
                    "baseRate": "900",
                    "fuelSurcharge": "0",
                    "securityFee": "0",
                    "documentation": "0"
                }
            },
            "validUntil": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(rate.price().breakdown().total(), d(500));
    }

    #[test]
    fn stored_price_with_additional_fees_reloads_unchanged() {
        let price = RatePrice::from_breakdown(
            PriceBreakdown::new(d(500), d(75), d(25), d(15)),
            Currency::usd(),
        )
        .with_additional_fees([("Insurance", d(40))]);
        let back: RatePrice = serde_json::from_value(serde_json::to_value(&price).unwrap()).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn serializes_camel_case() {
        let price = RatePrice::from_breakdown(
            PriceBreakdown::new(d(1), d(2), d(3), d(4)),
            Currency::usd(),
        );
        let json = serde_json::to_value(&price).unwrap();
        assert!(json["breakdown"].get("baseRate").is_some());
        assert!(json.get("lineItems").is_none());
    }
}
