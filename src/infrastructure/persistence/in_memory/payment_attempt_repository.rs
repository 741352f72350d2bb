//! # In-Memory Payment Attempts
//!
//! Insert-only store for invoice stubs. A reconciliation view outside this
//! crate reads them; here they are only inspected by tests.

use crate::domain::entities::PaymentAttempt;
use crate::infrastructure::persistence::traits::{
    PaymentAttemptRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`PaymentAttemptRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentAttemptRepository {
    attempts: Arc<RwLock<Vec<PaymentAttempt>>>,
}

impl InMemoryPaymentAttemptRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored stub, in insertion order.
    pub async fn all(&self) -> Vec<PaymentAttempt> {
        self.attempts.read().await.clone()
    }
}

#[async_trait]
impl PaymentAttemptRepository for InMemoryPaymentAttemptRepository {
    async fn insert(&self, attempt: &PaymentAttempt) -> RepositoryResult<()> {
        let mut attempts = self.attempts.write().await;
        if attempts.iter().any(|a| a.payment_id == attempt.payment_id) {
            return Err(RepositoryError::duplicate("PaymentAttempt", attempt.payment_id.as_str()));
        }
        attempts.push(attempt.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{Booking, CarrierRate, PriceBreakdown, RatePrice};
    use crate::domain::value_objects::{CarrierId, Currency, Owner, QuoteId, SubjectId, Timestamp};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn duplicate_payment_id_is_rejected() {
        let rate = CarrierRate::new(
            CarrierId::new("c1"),
            "ONE",
            "ocean",
            "30 days",
            RatePrice::from_breakdown(
                PriceBreakdown::new(Decimal::from(500), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
                Currency::usd(),
            ),
            Timestamp::now(),
        );
        let booking = Booking::builder(QuoteId::generate(), &rate, Owner::User(SubjectId::new("u1"))).build();
        let attempt = PaymentAttempt::pending_for(&booking);

        let repo = InMemoryPaymentAttemptRepository::new();
        repo.insert(&attempt).await.unwrap();
        assert!(repo.insert(&attempt).await.is_err());
        assert_eq!(repo.all().await.len(), 1);
    }
}
