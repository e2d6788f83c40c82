//! Redis-backed `CacheStore`.
//!
//! Uses `deadpool-redis` for connection pooling. Values are stored as plain
//! strings with millisecond expiry; owner index sets are Redis sets whose
//! expiry is refreshed on every add.
//!
//! # Commands
//!
//! - get: `GET`
//! - set_with_expiry: `PSETEX`
//! - delete: `DEL` (no-op for an empty key list)
//! - add_to_set: `SADD` + `PEXPIRE`, pipelined
//! - set_members: `SMEMBERS`

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::CacheStore;

/// Redis cache store.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a store from a Redis URL. No connection is made until first use.
    pub fn from_url(redis_url: &str) -> DomainResult<Self> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(&self) -> DomainResult<Connection> {
        Ok(self.pool.get().await?)
    }
}

/// Redis rejects a zero expiry, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.pset_ex(key, value, ttl_millis(ttl)).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> DomainResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> DomainResult<()> {
        let mut conn = self.connection().await?;
        let ttl_ms = i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX);
        let _: () = redis::pipe()
            .sadd(key, member)
            .ignore()
            .pexpire(key, ttl_ms)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> DomainResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }
}
