use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with expiring entries.
///
/// Values are opaque text. There are no transactional guarantees across
/// keys: each call stands on its own.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Store `value` under `key` for `ttl`, replacing any previous value
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()>;

    /// Remove every key in `keys`. Absent keys are not an error.
    async fn delete(&self, keys: &[String]) -> DomainResult<()>;

    /// Add `member` to the set stored under `key`, refreshing its TTL
    async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> DomainResult<()>;

    /// Members of the set stored under `key`; empty when absent
    async fn set_members(&self, key: &str) -> DomainResult<Vec<String>>;
}
