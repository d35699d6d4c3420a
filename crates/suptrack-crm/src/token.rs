// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached CRM bearer token with soft expiry.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

struct CachedToken {
    token: String,
    fetched_at: DateTime<Utc>,
}

/// Process-wide token cache, injected into the CRM client.
///
/// The token is reused until `ttl_min` minutes after it was fetched and
/// must be invalidated eagerly when the API answers 401.
pub struct TokenCache {
    inner: Mutex<Option<CachedToken>>,
    ttl: Duration,
}

impl TokenCache {
    pub fn new(ttl_min: u64) -> Self {
        Self {
            inner: Mutex::new(None),
            ttl: Duration::minutes(ttl_min as i64),
        }
    }

    /// The cached token, if still inside its soft expiry window.
    pub async fn get(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.inner.lock().await;
        guard
            .as_ref()
            .filter(|cached| now - cached.fetched_at < self.ttl)
            .map(|cached| cached.token.clone())
    }

    /// Store a freshly fetched token.
    pub async fn put(&self, token: String, now: DateTime<Utc>) {
        let mut guard = self.inner.lock().await;
        *guard = Some(CachedToken {
            token,
            fetched_at: now,
        });
    }

    /// Drop the cached token (called on 401).
    pub async fn invalidate(&self) {
        let mut guard = self.inner.lock().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_expires_after_ttl() {
        let cache = TokenCache::new(50);
        let now = Utc::now();

        cache.put("tok-1".to_string(), now).await;
        assert_eq!(cache.get(now).await.as_deref(), Some("tok-1"));
        assert_eq!(
            cache.get(now + Duration::minutes(49)).await.as_deref(),
            Some("tok-1")
        );
        assert!(cache.get(now + Duration::minutes(50)).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_clears_immediately() {
        let cache = TokenCache::new(50);
        let now = Utc::now();

        cache.put("tok-1".to_string(), now).await;
        cache.invalidate().await;
        assert!(cache.get(now).await.is_none());
    }
}
