//! # Rate Request
//!
//! A shipment request as submitted by a customer. Created once per quote
//! attempt and never mutated.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::entities::rate_request::RateRequest;
//! use freight_quote::domain::value_objects::ServiceType;
//! use rust_decimal::Decimal;
//!
//! let request = RateRequest::builder("Shanghai, China", "Rotterdam", Decimal::from(1200))
//!     .service_type(ServiceType::Ocean)
//!     .cargo_type("general")
//!     .build()
//!     .unwrap();
//! assert_eq!(request.origin(), "Shanghai, China");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::ServiceType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Package dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length in cm.
    #[serde(default)]
    pub length: Decimal,
    /// Width in cm.
    #[serde(default)]
    pub width: Decimal,
    /// Height in cm.
    #[serde(default)]
    pub height: Decimal,
}

impl Dimensions {
    /// Volume in cubic metres, or `None` when any side is not positive.
    #[must_use]
    pub fn volume_cbm(&self) -> Option<Decimal> {
        let sides = [self.length, self.width, self.height];
        if sides.iter().any(|side| *side <= Decimal::ZERO) {
            return None;
        }
        Some(self.length * self.width * self.height / Decimal::from(1_000_000))
    }
}

/// Contact block of the requester.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// E-mail address.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Company.
    #[serde(default)]
    pub company: String,
}

/// Customer rate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    origin: String,
    destination: String,
    #[serde(alias = "weight")]
    weight_kg: Decimal,
    #[serde(default, alias = "value", skip_serializing_if = "Option::is_none")]
    declared_value: Option<Decimal>,
    service_type: ServiceType,
    #[serde(default)]
    cargo_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume_cbm: Option<Decimal>,
    #[serde(default)]
    incoterms: String,
    #[serde(default)]
    urgency: String,
    #[serde(default)]
    additional_services: Vec<String>,
    #[serde(default, alias = "contactInfo")]
    contact: ContactInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    submitted_rates: Vec<serde_json::Value>,
}

impl RateRequest {
    /// Starts a builder with the required fields.
    #[must_use]
    pub fn builder(
        origin: impl Into<String>,
        destination: impl Into<String>,
        weight_kg: Decimal,
    ) -> RateRequestBuilder {
        RateRequestBuilder::new(origin, destination, weight_kg)
    }

    /// Checks field-level rules.
    ///
    /// # Errors
    ///
    /// - `MissingField` when origin or destination is blank
    /// - `Validation` when weight, value or volume is negative
    pub fn validate(&self) -> DomainResult<()> {
        if self.origin.trim().is_empty() {
            return Err(DomainError::MissingField("origin"));
        }
        if self.destination.trim().is_empty() {
            return Err(DomainError::MissingField("destination"));
        }
        if self.weight_kg < Decimal::ZERO {
            return Err(DomainError::validation("weight must not be negative"));
        }
        if self.declared_value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(DomainError::validation("declared value must not be negative"));
        }
        if self.volume_cbm.is_some_and(|v| v < Decimal::ZERO) {
            return Err(DomainError::validation("volume must not be negative"));
        }
        Ok(())
    }

    /// Free-text origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Free-text destination.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Cargo weight in kilograms.
    #[inline]
    #[must_use]
    pub fn weight_kg(&self) -> Decimal {
        self.weight_kg
    }

    /// Declared cargo value.
    #[inline]
    #[must_use]
    pub fn declared_value(&self) -> Option<Decimal> {
        self.declared_value
    }

    /// Requested transport mode.
    #[inline]
    #[must_use]
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Cargo description (`general`, `hazardous`, ...).
    #[inline]
    #[must_use]
    pub fn cargo_type(&self) -> &str {
        &self.cargo_type
    }

    /// Package dimensions.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dimensions.as_ref()
    }

    /// Explicit volume, else the volume implied by the dimensions.
    #[must_use]
    pub fn volume_cbm(&self) -> Option<Decimal> {
        self.volume_cbm
            .or_else(|| self.dimensions.and_then(|d| d.volume_cbm()))
    }

    /// Incoterms.
    #[inline]
    #[must_use]
    pub fn incoterms(&self) -> &str {
        &self.incoterms
    }

    /// Urgency.
    #[inline]
    #[must_use]
    pub fn urgency(&self) -> &str {
        &self.urgency
    }

    /// Additional service codes.
    #[inline]
    #[must_use]
    pub fn additional_services(&self) -> &[String] {
        &self.additional_services
    }

    /// Requester contact.
    #[inline]
    #[must_use]
    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Loosely-shaped rates collected by the client.
    #[inline]
    #[must_use]
    pub fn submitted_rates(&self) -> &[serde_json::Value] {
        &self.submitted_rates
    }
}

/// Builder for [`RateRequest`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RateRequestBuilder {
    request: RateRequest,
}

impl RateRequestBuilder {
    /// Creates a builder; service type defaults to ocean.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, weight_kg: Decimal) -> Self {
        Self {
            request: RateRequest {
                origin: origin.into(),
                destination: destination.into(),
                weight_kg,
                declared_value: None,
                service_type: ServiceType::Ocean,
                cargo_type: String::new(),
                dimensions: None,
                volume_cbm: None,
                incoterms: String::new(),
                urgency: String::new(),
                additional_services: Vec::new(),
                contact: ContactInfo::default(),
                submitted_rates: Vec::new(),
            },
        }
    }

    /// Sets the transport mode.
    pub fn service_type(mut self, service_type: ServiceType) -> Self {
        self.request.service_type = service_type;
        self
    }

    /// Sets the cargo type.
    pub fn cargo_type(mut self, cargo_type: impl Into<String>) -> Self {
        self.request.cargo_type = cargo_type.into();
        self
    }

    /// Sets the declared value.
    pub fn declared_value(mut self, value: Decimal) -> Self {
        self.request.declared_value = Some(value);
        self
    }

    /// Sets the package dimensions.
    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.request.dimensions = Some(dimensions);
        self
    }

    /// Sets an explicit volume.
    pub fn volume_cbm(mut self, volume: Decimal) -> Self {
        self.request.volume_cbm = Some(volume);
        self
    }

    /// Sets incoterms.
    pub fn incoterms(mut self, incoterms: impl Into<String>) -> Self {
        self.request.incoterms = incoterms.into();
        self
    }

    /// Sets urgency.
    pub fn urgency(mut self, urgency: impl Into<String>) -> Self {
        self.request.urgency = urgency.into();
        self
    }

    /// Adds an additional service code.
    pub fn additional_service(mut self, code: impl Into<String>) -> Self {
        self.request.additional_services.push(code.into());
        self
    }

    /// Sets the contact block.
    pub fn contact(mut self, contact: ContactInfo) -> Self {
        self.request.contact = contact;
        self
    }

    /// Adds a loosely-shaped client rate.
    pub fn submitted_rate(mut self, rate: serde_json::Value) -> Self {
        self.request.submitted_rates.push(rate);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first rule violated, see [`RateRequest::validate`].
    pub fn build(self) -> DomainResult<RateRequest> {
        self.request.validate()?;
        Ok(self.request)
    }
}
