//! # Token Cache
//!
//! In-process cache for one adapter's bearer token.
//!
//! The lock is held across the refresh call, so concurrent callers that find
//! the token stale wait for the single in-flight refresh and then reuse its
//! result instead of issuing their own.
//!
//! # Examples
//!
//! ```
//! use freight_quote::infrastructure::rates::token_cache::TokenCache;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let cache = TokenCache::new(Duration::from_secs(3600), Duration::from_secs(300));
//! let token = cache
//!     .get_or_refresh(|| async { Ok("abc".to_string()) })
//!     .await
//!     .unwrap();
//! assert_eq!(token, "abc");
//! # });
//! ```

use crate::infrastructure::rates::error::ProviderResult;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Bearer token cache with a trailing safety margin.
#[derive(Debug)]
pub struct TokenCache {
    state: Mutex<Option<CachedToken>>,
    lifetime: Duration,
    margin: Duration,
}

impl TokenCache {
    /// Creates an empty cache.
    ///
    /// Tokens are considered valid for `lifetime` after they were fetched,
    /// and are refreshed once fewer than `margin` remain.
    #[must_use]
    pub fn new(lifetime: Duration, margin: Duration) -> Self {
        Self {
            state: Mutex::new(None),
            lifetime,
            margin,
        }
    }

    /// Returns the cached token, refreshing it first if it is missing or
    /// inside the safety margin.
    ///
    /// # Errors
    ///
    /// Propagates the refresh error. The previously stored token, if any, is
    /// kept but not returned, so the next call refreshes again.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> ProviderResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProviderResult<String>>,
    {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        if let Some(token) = state.as_ref().filter(|t| self.is_fresh(t, now)) {
            return Ok(token.value.clone());
        }

        let value = refresh().await?;
        tracing::debug!(lifetime_secs = self.lifetime.as_secs(), "bearer token refreshed");
        *state = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + self.lifetime,
        });
        Ok(value)
    }

    /// Drops the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    /// Returns true if a usable token is cached.
    pub async fn has_valid_token(&self) -> bool {
        let state = self.state.lock().await;
        state
            .as_ref()
            .is_some_and(|t| self.is_fresh(t, Instant::now()))
    }

    fn is_fresh(&self, token: &CachedToken, now: Instant) -> bool {
        token
            .expires_at
            .checked_duration_since(now)
            .is_some_and(|left| left > self.margin)
    }
}
