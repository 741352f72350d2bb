//! # Contract Rate
//!
//! Negotiated lane price agreed with a carrier, optionally private to one
//! organization.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Currency, LocationCode, OrganizationId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A negotiated contract rate for one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRate {
    id: String,
    carrier: String,
    origin: LocationCode,
    destination: LocationCode,
    container_type: String,
    price: Decimal,
    currency: Currency,
    effective_from: Timestamp,
    expires_at: Timestamp,
    organization: Option<OrganizationId>,
}

impl ContractRate {
    /// Creates a contract.
    ///
    /// # Errors
    ///
    /// - `Validation` if the price is negative or the window is inverted
    /// - `MissingField` if id or carrier is blank
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        carrier: impl Into<String>,
        origin: LocationCode,
        destination: LocationCode,
        container_type: impl Into<String>,
        price: Decimal,
        currency: Currency,
        effective_from: Timestamp,
        expires_at: Timestamp,
    ) -> DomainResult<Self> {
        let id = id.into();
        let carrier = carrier.into();
        if id.trim().is_empty() {
            return Err(DomainError::MissingField("id"));
        }
        if carrier.trim().is_empty() {
            return Err(DomainError::MissingField("carrier"));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::validation("contract price must not be negative"));
        }
        if expires_at.is_before(&effective_from) {
            return Err(DomainError::validation("contract expires before it starts"));
        }
        Ok(Self {
            id,
            carrier,
            origin,
            destination,
            container_type: container_type.into(),
            price,
            currency,
            effective_from,
            expires_at,
            organization: None,
        })
    }

    /// Restricts the contract to one organization.
    #[must_use]
    pub fn for_organization(mut self, organization: OrganizationId) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Returns true if the contract is in force at `at`.
    #[must_use]
    pub fn is_active_at(&self, at: &Timestamp) -> bool {
        !at.is_before(&self.effective_from) && !at.is_after(&self.expires_at)
    }

    /// Returns true if `organization` may use this contract.
    #[must_use]
    pub fn is_visible_to(&self, organization: Option<&OrganizationId>) -> bool {
        match &self.organization {
            None => true,
            Some(own) => organization == Some(own),
        }
    }

    /// Contract id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Carrier name.
    #[inline]
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Origin code.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &LocationCode {
        &self.origin
    }

    /// Destination code.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &LocationCode {
        &self.destination
    }

    /// Container type (`20GP`, `40HC`, ...).
    #[inline]
    #[must_use]
    pub fn container_type(&self) -> &str {
        &self.container_type
    }

    /// Contract price.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// End of validity.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }
}
