//! In-process `CacheStore` backed by a moka TTL cache.
//!
//! Each write carries its own TTL through a per-entry `Expiry` policy, so
//! list entries, item entries and owner index sets can expire independently.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::CacheStore;

/// Default maximum number of cached entries.
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
enum CachedValue {
    Text(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    ttl: Duration,
}

/// Expires every entry `ttl` after its latest write.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-backed cache store.
#[derive(Clone)]
pub struct MokaCacheStore {
    entries: Cache<String, CacheEntry>,
}

impl MokaCacheStore {
    /// Create a store holding at most 10 000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Create a store holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }
}

impl Default for MokaCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_type(key: &str) -> DomainError {
    DomainError::CacheError(format!("key {key} holds a value of the wrong type"))
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        match self.entries.get(key).await {
            Some(CacheEntry { value: CachedValue::Text(text), .. }) => Ok(Some(text)),
            Some(_) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()> {
        let entry = CacheEntry {
            value: CachedValue::Text(value.to_string()),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> DomainResult<()> {
        for key in keys {
            self.entries.invalidate(key).await;
        }
        Ok(())
    }

    async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> DomainResult<()> {
        let member = member.to_string();
        self.entries
            .entry(key.to_string())
            .and_upsert_with(|existing| {
                let mut members = match existing.map(|entry| entry.into_value().value) {
                    Some(CachedValue::Set(members)) => members,
                    _ => HashSet::new(),
                };
                members.insert(member);
                std::future::ready(CacheEntry {
                    value: CachedValue::Set(members),
                    ttl,
                })
            })
            .await;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> DomainResult<Vec<String>> {
        match self.entries.get(key).await {
            Some(CacheEntry { value: CachedValue::Set(members), .. }) => Ok(members.into_iter().collect()),
            Some(_) => Err(wrong_type(key)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MokaCacheStore::new();
        cache.set_with_expiry("tasks:u1", "[]", TTL).await.unwrap();

        assert_eq!(cache.get("tasks:u1").await.unwrap(), Some("[]".to_string()));
        assert_eq!(cache.get("tasks:u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MokaCacheStore::new();
        cache.set_with_expiry("k", "v", TTL).await.unwrap();

        let keys = vec!["k".to_string(), "never-written".to_string()];
        cache.delete(&keys).await.unwrap();
        cache.delete(&keys).await.unwrap();
        cache.delete(&[]).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MokaCacheStore::new();
        cache.set_with_expiry("short", "v", Duration::from_millis(100)).await.unwrap();
        cache.set_with_expiry("long", "v", TTL).await.unwrap();

        assert!(cache.get("short").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_accumulates_members() {
        let cache = MokaCacheStore::new();
        cache.add_to_set("idx", "a", TTL).await.unwrap();
        cache.add_to_set("idx", "b", TTL).await.unwrap();
        cache.add_to_set("idx", "a", TTL).await.unwrap();

        let mut members = cache.set_members("idx").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
        assert!(cache.set_members("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_mismatch_is_an_error() {
        let cache = MokaCacheStore::new();
        cache.add_to_set("idx", "a", TTL).await.unwrap();
        cache.set_with_expiry("text", "v", TTL).await.unwrap();

        assert!(matches!(cache.get("idx").await, Err(DomainError::CacheError(_))));
        assert!(matches!(cache.set_members("text").await, Err(DomainError::CacheError(_))));
    }

    #[test]
    fn test_expiry_policy_uses_entry_ttl() {
        let entry = CacheEntry {
            value: CachedValue::Text(String::new()),
            ttl: Duration::from_secs(300),
        };
        let policy = PerEntryTtl;
        let key = "tasks:u1".to_string();

        assert_eq!(policy.expire_after_create(&key, &entry, Instant::now()), Some(Duration::from_secs(300)));
        assert_eq!(
            policy.expire_after_update(&key, &entry, Instant::now(), Some(Duration::from_secs(1))),
            Some(Duration::from_secs(300))
        );
    }
}
