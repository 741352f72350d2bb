//! # In-Memory Quote Repository
//!
//! In-memory implementation of [`QuoteRepository`].
//!
//! This implementation uses a thread-safe `HashMap` for storage, making it
//! suitable for unit tests and single-node deployments without a database.

use crate::domain::entities::Quote;
use crate::domain::value_objects::{OrganizationId, Owner, QuoteId, SubjectId, Timestamp};
use crate::infrastructure::persistence::traits::{QuoteRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`QuoteRepository`].
#[derive(Debug, Clone)]
pub struct InMemoryQuoteRepository {
    storage: Arc<RwLock<HashMap<QuoteId, Quote>>>,
}

impl InMemoryQuoteRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all quotes.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }

    async fn find_where<F>(&self, predicate: F) -> Vec<Quote>
    where
        F: Fn(&Quote) -> bool,
    {
        let storage = self.storage.read().await;
        let mut quotes: Vec<Quote> = storage.values().filter(|q| predicate(q)).cloned().collect();
        quotes.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| a.id().cmp(b.id())));
        quotes
    }
}

impl Default for InMemoryQuoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, quote: &Quote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(quote.id()) {
            return Err(RepositoryError::duplicate("Quote", quote.id().as_str()));
        }
        storage.insert(quote.id().clone(), quote.clone());
        Ok(())
    }

    async fn get(&self, id: &QuoteId) -> RepositoryResult<Option<Quote>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_organization(&self, organization: &OrganizationId) -> RepositoryResult<Vec<Quote>> {
        Ok(self
            .find_where(|q| q.organization() == Some(organization))
            .await)
    }

    async fn find_personal(&self, subject: &SubjectId) -> RepositoryResult<Vec<Quote>> {
        Ok(self
            .find_where(|q| q.owner().subject() == Some(subject))
            .await)
    }

    async fn count_in_month(&self, owner: &Owner, at: Timestamp) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        let count = storage
            .values()
            .filter(|q| q.owner() == owner && q.created_at().same_month_as(&at))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{LaneCodes, RateRequest};
    use crate::domain::value_objects::{LocationCode, QuoteStatus};
    use rust_decimal::Decimal;

    fn quote(owner: Owner, created_at: Timestamp) -> Quote {
        let request = RateRequest::builder("Shanghai", "Rotterdam", Decimal::from(500))
            .build()
            .unwrap();
        Quote::from_parts(
            QuoteId::generate(),
            request,
            Some(LaneCodes {
                origin: LocationCode::new("CNSHA").unwrap(),
                destination: LocationCode::new("NLRTM").unwrap(),
            }),
            Vec::new(),
            QuoteStatus::Success,
            owner,
            created_at,
        )
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryQuoteRepository::new();
        let q = quote(Owner::User(SubjectId::new("u1")), Timestamp::now());
        repo.insert(&q).await.unwrap();
        assert_eq!(repo.get(q.id()).await.unwrap(), Some(q));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let repo = InMemoryQuoteRepository::new();
        let q = quote(Owner::User(SubjectId::new("u1")), Timestamp::now());
        repo.insert(&q).await.unwrap();
        let err = repo.insert(&q).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn listings_are_scoped_and_newest_first() {
        let repo = InMemoryQuoteRepository::new();
        let now = Timestamp::now();
        let org = OrganizationId::new("o1");
        let older = quote(Owner::User(SubjectId::new("u1")), now.add_hours(-2));
        let newer = quote(Owner::User(SubjectId::new("u1")), now);
        let org_quote = quote(Owner::Organization(org.clone()), now);
        for q in [&older, &newer, &org_quote] {
            repo.insert(q).await.unwrap();
        }

        let personal = repo.find_personal(&SubjectId::new("u1")).await.unwrap();
        assert_eq!(personal.len(), 2);
        assert_eq!(personal[0].id(), newer.id());

        let by_org = repo.find_by_organization(&org).await.unwrap();
        assert_eq!(by_org.len(), 1);
        assert!(repo.find_personal(&SubjectId::new("u2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn count_in_month_ignores_other_months() {
        let repo = InMemoryQuoteRepository::new();
        let owner = Owner::User(SubjectId::new("u1"));
        let now = Timestamp::now();
        repo.insert(&quote(owner.clone(), now)).await.unwrap();
        repo.insert(&quote(owner.clone(), now.add_days(-62))).await.unwrap();
        repo.insert(&quote(Owner::User(SubjectId::new("u2")), now)).await.unwrap();

        assert_eq!(repo.count_in_month(&owner, now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_empties_repository() {
        let repo = InMemoryQuoteRepository::new();
        repo.insert(&quote(Owner::User(SubjectId::new("u1")), Timestamp::now()))
            .await
            .unwrap();
        repo.clear().await;
        assert!(repo.is_empty());
    }
}
