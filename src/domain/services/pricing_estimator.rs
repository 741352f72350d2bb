//! # Pricing Estimator
//!
//! Deterministic synthetic pricing: distance plus weight plus surcharges.
//!
//! The estimator never performs I/O and never fails, which makes it the
//! fallback rate source for every lane.
//!
//! # Algorithm
//!
//! ```text
//! subtotal   = distance_km * rate_km + weight_kg * rate_kg
//! fuel       = 15% of subtotal
//! hazardous  = 25% of subtotal when cargo type mentions "hazardous"
//! total      = subtotal + fuel + hazardous + security (25) + documentation (15)
//! ```
//!
//! Distance is the haversine great-circle distance between known city
//! centroids. When either city is unknown the estimator uses a fixed
//! long-haul distance of 5,000 km.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::services::pricing_estimator::PricingEstimator;
//! use freight_quote::domain::value_objects::ServiceType;
//! use rust_decimal::Decimal;
//!
//! let estimator = PricingEstimator::default();
//! let sea = estimator.estimate("London", "Hamburg", Decimal::from(1000), ServiceType::Ocean, "general");
//! let express = estimator.estimate("London", "Hamburg", Decimal::from(1000), ServiceType::Express, "general");
//! assert!(sea.total < express.total);
//! assert_eq!(estimator.estimate_transit_time("London", "Hamburg", ServiceType::Ocean), "10-14 days");
//! ```

use crate::domain::entities::carrier_rate::PriceBreakdown;
use crate::domain::value_objects::{ServiceType, decimal_from_f64, percent_of, round_money};
use rust_decimal::Decimal;

/// Distance used when a city is not in the table.
pub const DEFAULT_DISTANCE_KM: f64 = 5_000.0;

/// Mean Earth radius used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Weight assumed when the request carries none.
const DEFAULT_WEIGHT_KG: i64 = 100;

const FUEL_SURCHARGE_PERCENT: u32 = 15;
const HAZARDOUS_SURCHARGE_PERCENT: u32 = 25;
const SECURITY_FEE: i64 = 25;
const DOCUMENTATION_FEE: i64 = 15;

/// City centroids in lookup order.
const CITY_COORDS: &[(&str, f64, f64)] = &[
    ("london", 51.5074, -0.1278),
    ("hamburg", 53.5511, 9.9937),
    ("rotterdam", 51.9225, 4.4792),
    ("new york", 40.7128, -74.0060),
    ("shanghai", 31.2304, 121.4737),
    ("singapore", 1.3521, 103.8198),
    ("tokyo", 35.6762, 139.6503),
    ("los angeles", 34.0522, -118.2437),
    ("dubai", 25.2048, 55.2708),
    ("paris", 48.8566, 2.3522),
    ("frankfurt", 50.1109, 8.6821),
    ("hong kong", 22.3193, 114.1694),
    ("miami", 25.7617, -80.1918),
    ("southampton", 50.9097, -1.4044),
    ("felixstowe", 51.9642, 1.3515),
];

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coordinates {
    /// Great-circle distance in kilometres.
    ///
    /// # Examples
    ///
    /// ```
    /// use freight_quote::domain::services::pricing_estimator::Coordinates;
    ///
    /// let london = Coordinates { lat: 51.5074, lng: -0.1278 };
    /// let paris = Coordinates { lat: 48.8566, lng: 2.3522 };
    /// let d = london.haversine_km(&paris);
    /// assert!((d - 343.5).abs() < 1.0);
    /// ```
    #[must_use]
    pub fn haversine_km(&self, other: &Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// Per-distance and per-weight tariff of one service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tariff {
    /// Price per kilometre.
    pub per_km: Decimal,
    /// Price per kilogram.
    pub per_kg: Decimal,
}

impl Tariff {
    /// Built-in tariff; road has no dedicated rate and uses the generic one.
    #[must_use]
    pub fn for_service(service_type: ServiceType) -> Self {
        match service_type {
            ServiceType::Ocean => Self {
                per_km: Decimal::new(8, 2),
                per_kg: Decimal::new(25, 1),
            },
            ServiceType::Air => Self {
                per_km: Decimal::new(35, 2),
                per_kg: Decimal::from(8),
            },
            ServiceType::Express => Self {
                per_km: Decimal::new(50, 2),
                per_kg: Decimal::from(12),
            },
            ServiceType::Road => Self {
                per_km: Decimal::new(20, 2),
                per_kg: Decimal::from(5),
            },
        }
    }
}

/// Output of [`PricingEstimator::estimate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Canonical breakdown; `base_rate` absorbs distance, weight and
    /// hazardous components so the four fields sum to `total`.
    pub breakdown: PriceBreakdown,
    /// Total price.
    pub total: Decimal,
    /// Distance component before surcharges.
    pub distance_charge: Decimal,
    /// Weight component before surcharges.
    pub weight_charge: Decimal,
    /// Hazardous surcharge, zero for ordinary cargo.
    pub hazardous_surcharge: Decimal,
    /// Distance used for pricing.
    pub distance_km: f64,
    /// False when the default long-haul distance was used.
    pub distance_known: bool,
}

/// Synthetic price and transit estimator.
#[derive(Debug, Clone)]
pub struct PricingEstimator {
    cities: Vec<(String, Coordinates)>,
}

impl PricingEstimator {
    /// Creates an estimator over a custom centroid table.
    #[must_use]
    pub fn with_cities<'a, I>(cities: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64, f64)>,
    {
        Self {
            cities: cities
                .into_iter()
                .map(|(name, lat, lng)| (name.to_lowercase(), Coordinates { lat, lng }))
                .collect(),
        }
    }

    /// Finds centroid coordinates for an address.
    ///
    /// Only the part before the first comma is compared; a key matches when
    /// either string contains the other.
    #[must_use]
    pub fn coordinates(&self, address: &str) -> Option<Coordinates> {
        let city = address.split(',').next().unwrap_or_default().trim().to_lowercase();
        if city.is_empty() {
            return None;
        }
        self.cities
            .iter()
            .find(|(key, _)| city.contains(key.as_str()) || key.contains(city.as_str()))
            .map(|(_, coords)| *coords)
    }

    /// Distance between two addresses and whether both were known.
    #[must_use]
    pub fn distance_km(&self, origin: &str, destination: &str) -> (f64, bool) {
        match (self.coordinates(origin), self.coordinates(destination)) {
            (Some(a), Some(b)) => (a.haversine_km(&b), true),
            _ => (DEFAULT_DISTANCE_KM, false),
        }
    }

    /// Prices a shipment. Never fails.
    ///
    /// A non-positive weight is priced as 100 kg.
    #[must_use]
    pub fn estimate(
        &self,
        origin: &str,
        destination: &str,
        weight_kg: Decimal,
        service_type: ServiceType,
        cargo_type: &str,
    ) -> Estimate {
        let (distance_km, distance_known) = self.distance_km(origin, destination);
        let weight_kg = if weight_kg > Decimal::ZERO {
            weight_kg
        } else {
            Decimal::from(DEFAULT_WEIGHT_KG)
        };
        let tariff = Tariff::for_service(service_type);

        let distance = decimal_from_f64(distance_km).unwrap_or(Decimal::ZERO);
        let distance_charge = distance * tariff.per_km;
        let weight_charge = weight_kg * tariff.per_kg;
        let subtotal = distance_charge + weight_charge;

        let fuel = percent_of(subtotal, FUEL_SURCHARGE_PERCENT);
        let hazardous = if cargo_type.to_lowercase().contains("hazardous") {
            percent_of(subtotal, HAZARDOUS_SURCHARGE_PERCENT)
        } else {
            Decimal::ZERO
        };
        let security = Decimal::from(SECURITY_FEE);
        let documentation = Decimal::from(DOCUMENTATION_FEE);

        let total = round_money(subtotal) + fuel + hazardous + security + documentation;
        let breakdown = PriceBreakdown::new(Decimal::ZERO, fuel, security, documentation).reconcile(total);

        Estimate {
            breakdown,
            total,
            distance_charge: round_money(distance_charge),
            weight_charge: round_money(weight_charge),
            hazardous_surcharge: hazardous,
            distance_km,
            distance_known,
        }
    }

    /// Banded transit range by distance and mode, e.g. `14-21 days`.
    #[must_use]
    pub fn estimate_transit_time(&self, origin: &str, destination: &str, service_type: ServiceType) -> &'static str {
        let (distance_km, _) = self.distance_km(origin, destination);
        transit_band(distance_km, service_type)
    }
}

impl Default for PricingEstimator {
    fn default() -> Self {
        Self::with_cities(CITY_COORDS.iter().copied())
    }
}

fn transit_band(distance_km: f64, service_type: ServiceType) -> &'static str {
    match service_type {
        ServiceType::Express => {
            if distance_km < 2_000.0 {
                "1-2 days"
            } else if distance_km < 5_000.0 {
                "2-3 days"
            } else {
                "3-5 days"
            }
        }
        ServiceType::Air => {
            if distance_km < 2_000.0 {
                "2-4 days"
            } else if distance_km < 5_000.0 {
                "4-7 days"
            } else {
                "7-10 days"
            }
        }
        ServiceType::Ocean | ServiceType::Road => {
            if distance_km < 2_000.0 {
                "10-14 days"
            } else if distance_km < 5_000.0 {
                "14-21 days"
            } else if distance_km < 10_000.0 {
                "21-30 days"
            } else {
                "30-45 days"
            }
        }
    }
}
