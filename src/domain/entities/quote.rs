//! # Quote Entity
//!
//! A persisted rate request together with its ordered, normalized rates.
//!
//! Quotes are immutable after creation; re-pricing produces a new quote.

use crate::domain::entities::carrier_rate::CarrierRate;
use crate::domain::entities::rate_request::RateRequest;
use crate::domain::value_objects::{
    CarrierId, LocationCode, OrganizationId, Owner, QuoteId, QuoteStatus, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved codes for the request's origin and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneCodes {
    /// Origin code.
    pub origin: LocationCode,
    /// Destination code.
    pub destination: LocationCode,
}

impl fmt::Display for LaneCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}

/// A persisted quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    id: QuoteId,
    request: RateRequest,
    lane: Option<LaneCodes>,
    rates: Vec<CarrierRate>,
    status: QuoteStatus,
    owner: Owner,
    created_at: Timestamp,
}

impl Quote {
    /// Creates a successful quote with a fresh id.
    ///
    /// `rates` must already be in their final order.
    #[must_use]
    pub fn success(request: RateRequest, lane: LaneCodes, rates: Vec<CarrierRate>, owner: Owner) -> Self {
        Self {
            id: QuoteId::generate(),
            request,
            lane: Some(lane),
            rates,
            status: QuoteStatus::Success,
            owner,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a failed quote kept for the record.
    #[must_use]
    pub fn failed(request: RateRequest, lane: Option<LaneCodes>, owner: Owner) -> Self {
        Self {
            id: QuoteId::generate(),
            request,
            lane,
            rates: Vec::new(),
            status: QuoteStatus::Failed,
            owner,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstructs a quote from storage.
    #[must_use]
    pub fn from_parts(
        id: QuoteId,
        request: RateRequest,
        lane: Option<LaneCodes>,
        rates: Vec<CarrierRate>,
        status: QuoteStatus,
        owner: Owner,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            request,
            lane,
            rates,
            status,
            owner,
            created_at,
        }
    }

    /// Looks up a rate by carrier id.
    #[must_use]
    pub fn find_rate(&self, carrier_id: &CarrierId) -> Option<&CarrierRate> {
        self.rates.iter().find(|r| r.carrier_id() == carrier_id)
    }

    /// Cheapest rate, if any.
    #[must_use]
    pub fn best_rate(&self) -> Option<&CarrierRate> {
        self.rates.first()
    }

    /// Quote id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &QuoteId {
        &self.id
    }

    /// Original request.
    #[inline]
    #[must_use]
    pub fn request(&self) -> &RateRequest {
        &self.request
    }

    /// Resolved lane, absent when resolution never happened.
    #[inline]
    #[must_use]
    pub fn lane(&self) -> Option<&LaneCodes> {
        self.lane.as_ref()
    }

    /// Rates sorted by ascending amount.
    #[inline]
    #[must_use]
    pub fn rates(&self) -> &[CarrierRate] {
        &self.rates
    }

    /// Status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// Owner.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Owning organization, if any.
    #[must_use]
    pub fn organization(&self) -> Option<&OrganizationId> {
        self.owner.organization()
    }

    /// Creation time.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
