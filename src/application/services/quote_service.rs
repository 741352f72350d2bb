//! # Quote Service
//!
//! Creates, persists and lists quotes.
//!
//! A quote belongs to the caller's organization, else the caller, else a
//! fresh guest id. Free-tier owners are limited to a number of quotes per
//! calendar month; guests are not metered.
//!
//! When aggregation fails for any reason other than an unknown location, a
//! `failed` quote is stored for the record and the error is still returned.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::rate_aggregation::{AggregationError, RateAggregator};
use crate::domain::entities::{Quote, RateRequest};
use crate::domain::value_objects::{Identity, OrganizationId, Owner, QuoteId, Timestamp};
use crate::infrastructure::persistence::{AccountDirectory, QuoteRepository};
use std::sync::Arc;

/// Monthly quote limit of the free tier.
pub const DEFAULT_FREE_MONTHLY_QUOTES: u32 = 5;

/// Quote use cases.
#[derive(Debug)]
pub struct QuoteService {
    aggregator: Arc<RateAggregator>,
    quotes: Arc<dyn QuoteRepository>,
    accounts: Arc<dyn AccountDirectory>,
    free_monthly_limit: u32,
}

impl QuoteService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        aggregator: Arc<RateAggregator>,
        quotes: Arc<dyn QuoteRepository>,
        accounts: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            aggregator,
            quotes,
            accounts,
            free_monthly_limit: DEFAULT_FREE_MONTHLY_QUOTES,
        }
    }

    /// Overrides the free-tier monthly limit.
    #[must_use]
    pub fn with_free_monthly_limit(mut self, limit: u32) -> Self {
        self.free_monthly_limit = limit;
        self
    }

    /// Aggregator used for pricing.
    #[must_use]
    pub fn aggregator(&self) -> &RateAggregator {
        &self.aggregator
    }

    /// Prices a request and stores the result.
    ///
    /// # Errors
    ///
    /// - `Validation` if the request is malformed
    /// - `PlanLimitReached` if a free-tier owner used up the monthly quota
    /// - `LocationNotFound` if origin or destination do not resolve
    /// - `RateFetchFailed` if no rate was produced (a failed quote is stored)
    /// - `Repository` on storage failure
    pub async fn create_quote(&self, identity: &Identity, request: RateRequest) -> ApplicationResult<Quote> {
        request.validate()?;
        let owner = Owner::for_identity(identity);
        self.check_quota(&owner).await?;

        match self
            .aggregator
            .aggregate(&request, identity.organization.clone())
            .await
        {
            Ok(aggregated) => {
                let quote = Quote::success(request, aggregated.lane, aggregated.rates, owner);
                self.quotes.insert(&quote).await?;
                tracing::info!(
                    quote_id = %quote.id(),
                    owner = %quote.owner(),
                    rates = quote.rates().len(),
                    "quote created"
                );
                Ok(quote)
            }
            Err(error @ AggregationError::LocationNotFound { .. }) => Err(error.into()),
            Err(error) => {
                let lane = self.aggregator.resolve_lane(&request).ok();
                let quote = Quote::failed(request, lane, owner);
                if let Err(e) = self.quotes.insert(&quote).await {
                    tracing::error!(quote_id = %quote.id(), error = %e, "failed quote not stored");
                }
                tracing::warn!(quote_id = %quote.id(), error = %error, "quote failed");
                Err(error.into())
            }
        }
    }

    /// Fetches a quote by id.
    ///
    /// # Errors
    ///
    /// `QuoteNotFound` if the id is unknown.
    pub async fn get_quote(&self, id: &QuoteId) -> ApplicationResult<Quote> {
        self.quotes
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::QuoteNotFound(id.to_string()))
    }

    /// Lists quotes, newest first.
    ///
    /// With `organization`, lists that organization's quotes; the caller must
    /// be acting for it. Otherwise lists the caller's personal quotes.
    /// Guests get an empty list.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when listing another organization
    /// - `Repository` on storage failure
    pub async fn list_quotes(
        &self,
        identity: &Identity,
        organization: Option<&OrganizationId>,
    ) -> ApplicationResult<Vec<Quote>> {
        if let Some(org) = organization {
            if identity.organization.as_ref() != Some(org) {
                return Err(ApplicationError::unauthorized(format!(
                    "not a member of organization {org}"
                )));
            }
            return Ok(self.quotes.find_by_organization(org).await?);
        }
        match &identity.subject {
            Some(subject) => Ok(self.quotes.find_personal(subject).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Soft limit: count and insert are separate repository calls, see
    /// [`QuoteRepository::count_in_month`].
    async fn check_quota(&self, owner: &Owner) -> ApplicationResult<()> {
        if matches!(owner, Owner::Guest(_)) {
            return Ok(());
        }
        let tier = self.accounts.plan_of(owner).await?;
        if !tier.is_metered() {
            return Ok(());
        }
        let used = self.quotes.count_in_month(owner, Timestamp::now()).await?;
        if used >= u64::from(self.free_monthly_limit) {
            tracing::info!(owner = %owner, used, limit = self.free_monthly_limit, "plan limit reached");
            return Err(ApplicationError::PlanLimitReached {
                limit: self.free_monthly_limit,
                tier,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::rate_aggregation::AggregationConfig;
    use crate::domain::services::{LocationResolver, PricingEstimator};
    use crate::domain::value_objects::{PlanTier, QuoteStatus};
    use crate::infrastructure::persistence::in_memory::{
        InMemoryAccountDirectory, InMemoryQuoteRepository,
    };
    use crate::infrastructure::rates::StaticProviderRegistry;
    use rust_decimal::Decimal;

    struct Fixture {
        service: QuoteService,
        quotes: Arc<InMemoryQuoteRepository>,
        accounts: Arc<InMemoryAccountDirectory>,
    }

    fn fixture(config: AggregationConfig) -> Fixture {
        let aggregator = Arc::new(RateAggregator::new(
            LocationResolver::default(),
            PricingEstimator::default(),
            Arc::new(StaticProviderRegistry::new()),
            config,
        ));
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let accounts = Arc::new(InMemoryAccountDirectory::new());
        Fixture {
            service: QuoteService::new(aggregator, quotes.clone(), accounts.clone())
                .with_free_monthly_limit(2),
            quotes,
            accounts,
        }
    }

    fn request(origin: &str) -> RateRequest {
        RateRequest::builder(origin, "Rotterdam", Decimal::from(1200))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn creates_and_fetches_quote() {
        let f = fixture(AggregationConfig::default());
        let quote = f
            .service
            .create_quote(&Identity::user("u1"), request("Shanghai"))
            .await
            .unwrap();
        assert!(quote.id().as_str().starts_with("QT-"));
        assert_eq!(quote.status(), QuoteStatus::Success);
        assert!(!quote.rates().is_empty());

        let fetched = f.service.get_quote(quote.id()).await.unwrap();
        assert_eq!(fetched.id(), quote.id());
    }

    #[tokio::test]
    async fn unknown_quote_is_not_found() {
        let f = fixture(AggregationConfig::default());
        let err = f.service.get_quote(&QuoteId::new("QT-NOPE")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::QuoteNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_location_persists_nothing() {
        let f = fixture(AggregationConfig::default());
        let err = f
            .service
            .create_quote(&Identity::user("u1"), request("Atlantis"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::LocationNotFound { .. }));
        assert!(f.quotes.is_empty());
    }

    #[tokio::test]
    async fn failed_aggregation_stores_failed_quote() {
        let f = fixture(AggregationConfig::default().without_estimate());
        let err = f
            .service
            .create_quote(&Identity::user("u1"), request("Shanghai"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::RateFetchFailed(_)));

        let stored = f.service.list_quotes(&Identity::user("u1"), None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status(), QuoteStatus::Failed);
    }

    #[tokio::test]
    async fn free_tier_is_limited() {
        let f = fixture(AggregationConfig::default());
        let user = Identity::user("u1");
        f.service.create_quote(&user, request("Shanghai")).await.unwrap();
        f.service.create_quote(&user, request("Shanghai")).await.unwrap();
        let err = f.service.create_quote(&user, request("Shanghai")).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::PlanLimitReached { limit: 2, tier: PlanTier::Free }
        ));
    }

    #[tokio::test]
    async fn concurrent_burst_is_limited_afterwards() {
        let f = fixture(AggregationConfig::default());
        let user = Identity::user("u1");
        let (a, b, c) = tokio::join!(
            f.service.create_quote(&user, request("Shanghai")),
            f.service.create_quote(&user, request("Shanghai")),
            f.service.create_quote(&user, request("Shanghai")),
        );
        let created = [a, b, c].into_iter().filter(Result::is_ok).count();
        assert!(created >= 2);
        assert_eq!(f.quotes.len(), created);

        let err = f.service.create_quote(&user, request("Shanghai")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::PlanLimitReached { limit: 2, .. }));
    }

    #[tokio::test]
    async fn pro_tier_and_guests_are_unlimited() {
        let f = fixture(AggregationConfig::default());
        let org = Identity::user("u1").with_organization("org-1");
        f.accounts.set_plan(
            Owner::Organization(OrganizationId::new("org-1")),
            PlanTier::Pro,
        );
        for _ in 0..3 {
            f.service.create_quote(&org, request("Shanghai")).await.unwrap();
            f.service
                .create_quote(&Identity::guest(), request("Shanghai"))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn listing_by_scope() {
        let f = fixture(AggregationConfig::default());
        let personal = Identity::user("u1");
        let in_org = Identity::user("u1").with_organization("org-1");
        f.service.create_quote(&personal, request("Shanghai")).await.unwrap();
        f.service.create_quote(&in_org, request("Shanghai")).await.unwrap();
        f.service.create_quote(&Identity::guest(), request("Shanghai")).await.unwrap();

        assert_eq!(f.service.list_quotes(&personal, None).await.unwrap().len(), 1);
        let org = OrganizationId::new("org-1");
        assert_eq!(f.service.list_quotes(&in_org, Some(&org)).await.unwrap().len(), 1);
        assert!(f.service.list_quotes(&Identity::guest(), None).await.unwrap().is_empty());

        let err = f
            .service
            .list_quotes(&personal, Some(&org))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }
}
