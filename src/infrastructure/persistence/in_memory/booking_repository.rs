//! # In-Memory Booking Repository
//!
//! In-memory implementation of [`BookingRepository`].
//!
//! `update` compares the stored version with the caller's expectation under
//! the write lock, so two transitions racing on the same booking cannot both
//! apply.

use crate::domain::entities::Booking;
use crate::domain::value_objects::{BookingId, BookingStatus, OrganizationId, SubjectId};
use crate::infrastructure::persistence::traits::{
    BookingRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`BookingRepository`].
#[derive(Debug, Clone)]
pub struct InMemoryBookingRepository {
    storage: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored bookings.
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

    async fn find_where<F>(&self, predicate: F) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let storage = self.storage.read().await;
        let mut bookings: Vec<Booking> = storage.values().filter(|b| predicate(b)).cloned().collect();
        bookings.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| a.id().cmp(b.id())));
        bookings
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(booking.id()) {
            return Err(RepositoryError::duplicate("Booking", booking.id().as_str()));
        }
        storage.insert(booking.id().clone(), booking.clone());
        Ok(())
    }

    async fn get(&self, id: &BookingId) -> RepositoryResult<Option<Booking>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn update(&self, booking: &Booking, expected_version: u64) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let stored = storage
            .get_mut(booking.id())
            .ok_or_else(|| RepositoryError::not_found("Booking", booking.id().as_str()))?;
        if stored.version() != expected_version {
            return Err(RepositoryError::version_conflict(
                "Booking",
                booking.id().as_str(),
                expected_version,
                stored.version(),
            ));
        }
        *stored = booking.clone();
        Ok(())
    }

    async fn find_by_organization(&self, organization: &OrganizationId) -> RepositoryResult<Vec<Booking>> {
        Ok(self
            .find_where(|b| b.owner().organization() == Some(organization))
            .await)
    }

    async fn find_personal(&self, subject: &SubjectId) -> RepositoryResult<Vec<Booking>> {
        Ok(self.find_where(|b| b.owner().subject() == Some(subject)).await)
    }

    async fn find_by_status(&self, status: BookingStatus) -> RepositoryResult<Vec<Booking>> {
        let mut bookings = self.find_where(|b| b.status() == status).await;
        bookings.reverse();
        Ok(bookings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{CarrierRate, PriceBreakdown, RatePrice};
    use crate::domain::value_objects::{CarrierId, Currency, Owner, QuoteId, Timestamp};
    use rust_decimal::Decimal;

    fn booking(owner: Owner) -> Booking {
        let rate = CarrierRate::new(
            CarrierId::new("c1"),
            "Maersk",
            "ocean",
            "20-25 days",
            RatePrice::from_breakdown(
                PriceBreakdown::new(Decimal::from(900), Decimal::from(100), Decimal::ZERO, Decimal::ZERO),
                Currency::usd(),
            ),
            Timestamp::now().add_days(3),
        );
        Booking::builder(QuoteId::generate(), &rate, owner).build()
    }

    #[tokio::test]
    async fn update_with_current_version_succeeds() {
        let repo = InMemoryBookingRepository::new();
        let mut b = booking(Owner::User(SubjectId::new("u1")));
        repo.insert(&b).await.unwrap();

        let expected = b.version();
        b.approve(SubjectId::new("admin"), None).unwrap();
        repo.update(&b, expected).await.unwrap();

        let stored = repo.get(b.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), BookingStatus::Approved);
        assert_eq!(stored.version(), expected + 1);
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let repo = InMemoryBookingRepository::new();
        let original = booking(Owner::User(SubjectId::new("u1")));
        repo.insert(&original).await.unwrap();

        let mut approved = original.clone();
        approved.approve(SubjectId::new("a1"), None).unwrap();
        let mut rejected = original.clone();
        rejected.reject(SubjectId::new("a2"), "no capacity").unwrap();

        repo.update(&approved, original.version()).await.unwrap();
        let err = repo.update(&rejected, original.version()).await.unwrap_err();
        assert!(err.is_version_conflict());

        let stored = repo.get(original.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), BookingStatus::Approved);
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let repo = InMemoryBookingRepository::new();
        let b = booking(Owner::User(SubjectId::new("u1")));
        let err = repo.update(&b, 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn find_by_status_and_owner() {
        let repo = InMemoryBookingRepository::new();
        let org = OrganizationId::new("o1");
        repo.insert(&booking(Owner::Organization(org.clone()))).await.unwrap();
        repo.insert(&booking(Owner::User(SubjectId::new("u1")))).await.unwrap();

        assert_eq!(repo.find_by_status(BookingStatus::Pending).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_organization(&org).await.unwrap().len(), 1);
        assert_eq!(repo.find_personal(&SubjectId::new("u1")).await.unwrap().len(), 1);
        assert_eq!(repo.len(), 2);
    }
}
