//! # Domain Services
//!
//! Pure domain logic that doesn't belong to a single entity.
//!
//! ## Services
//!
//! - [`location_resolver::LocationResolver`]: free text to location code
//! - [`pricing_estimator::PricingEstimator`]: synthetic distance/weight pricing

pub mod location_resolver;
pub mod pricing_estimator;

pub use location_resolver::LocationResolver;
pub use pricing_estimator::{Estimate, PricingEstimator};
