use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use auth::TokenPair;
use moka::future::Cache;
use moka::ops::compute::CompResult;
use moka::ops::compute::Op;
use moka::Expiry;
use uuid::Uuid;

use crate::domain::auth::errors::SessionStoreError;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::SessionStore;

/// Cached session value. Each entry carries its own TTL so the expiry
/// policy can read it back.
#[derive(Debug, Clone)]
struct SessionEntry {
    tokens: TokenPair,
    ttl: Duration,
}

/// Expiry policy: entries live for the TTL they were stored with, counted
/// from the most recent write. A rotation therefore restarts the clock.
struct SessionExpiry;

impl Expiry<Uuid, SessionEntry> for SessionExpiry {
    fn expire_after_create(
        &self,
        _key: &Uuid,
        value: &SessionEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &Uuid,
        value: &SessionEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process session cache backed by moka.
///
/// moka guarantees per-key atomicity for entry operations, which is what the
/// single-active-pair invariant rests on; `replace_if_match` uses the
/// compute API so the compare and the swap are one operation.
pub struct MokaSessionStore {
    cache: Cache<Uuid, SessionEntry>,
}

impl MokaSessionStore {
    /// Create a store bounded to `max_capacity` concurrent sessions.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(SessionExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn set(
        &self,
        user_id: &UserId,
        tokens: TokenPair,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        self.cache
            .insert(user_id.0, SessionEntry { tokens, ttl })
            .await;
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<TokenPair>, SessionStoreError> {
        Ok(self.cache.get(&user_id.0).await.map(|entry| entry.tokens))
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), SessionStoreError> {
        self.cache.invalidate(&user_id.0).await;
        Ok(())
    }

    async fn replace_if_match(
        &self,
        user_id: &UserId,
        expected: &TokenPair,
        replacement: TokenPair,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError> {
        let result = self
            .cache
            .entry(user_id.0)
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) if entry.value().tokens == *expected => Op::Put(SessionEntry {
                        tokens: replacement,
                        ttl,
                    }),
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn pair(tag: &str) -> TokenPair {
        TokenPair {
            access_token: format!("access-{}", tag),
            refresh_token: format!("refresh-{}", tag),
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MokaSessionStore::new(10);
        let user_id = UserId::new();

        assert_eq!(store.get(&user_id).await.unwrap(), None);

        store.set(&user_id, pair("a"), TTL).await.unwrap();
        assert_eq!(store.get(&user_id).await.unwrap(), Some(pair("a")));

        store.delete(&user_id).await.unwrap();
        assert_eq!(store.get(&user_id).await.unwrap(), None);

        // Deleting an absent entry is fine
        store.delete(&user_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_replaces_previous_pair() {
        let store = MokaSessionStore::new(10);
        let user_id = UserId::new();

        store.set(&user_id, pair("a"), TTL).await.unwrap();
        store.set(&user_id, pair("b"), TTL).await.unwrap();

        assert_eq!(store.get(&user_id).await.unwrap(), Some(pair("b")));
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let store = MokaSessionStore::new(10);
        let user_id = UserId::new();

        store
            .set(&user_id, pair("a"), Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(store.get(&user_id).await.unwrap(), Some(pair("a")));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(store.get(&user_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_replace_if_match_swaps_on_equal() {
        let store = MokaSessionStore::new(10);
        let user_id = UserId::new();

        store.set(&user_id, pair("a"), TTL).await.unwrap();

        let swapped = store
            .replace_if_match(&user_id, &pair("a"), pair("b"), TTL)
            .await
            .unwrap();
        assert!(swapped);
        assert_eq!(store.get(&user_id).await.unwrap(), Some(pair("b")));
    }

    #[tokio::test]
    async fn test_replace_if_match_refuses_on_mismatch() {
        let store = MokaSessionStore::new(10);
        let user_id = UserId::new();

        store.set(&user_id, pair("a"), TTL).await.unwrap();

        let swapped = store
            .replace_if_match(&user_id, &pair("stale"), pair("b"), TTL)
            .await
            .unwrap();
        assert!(!swapped);
        assert_eq!(store.get(&user_id).await.unwrap(), Some(pair("a")));
    }

    #[tokio::test]
    async fn test_replace_if_match_refuses_on_absent() {
        let store = MokaSessionStore::new(10);
        let user_id = UserId::new();

        let swapped = store
            .replace_if_match(&user_id, &pair("a"), pair("b"), TTL)
            .await
            .unwrap();
        assert!(!swapped);
        assert_eq!(store.get(&user_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_replace_if_match_is_single_winner() {
        let store = Arc::new(MokaSessionStore::new(10));
        let user_id = UserId::new();
        store.set(&user_id, pair("a"), TTL).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .replace_if_match(&user_id, &pair("a"), pair(&format!("winner-{}", i)), TTL)
                    .await
                    .unwrap()
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
