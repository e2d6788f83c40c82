//! Cache layer adapters.
//!
//! Two `CacheStore` implementations: an in-process moka cache with
//! per-entry TTLs, and a shared Redis cache for multi-instance deployments.

pub mod memory;
pub mod redis;

pub use memory::MokaCacheStore;
pub use redis::RedisCacheStore;

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CacheBackend, CacheConfig};
use crate::domain::ports::CacheStore;

/// Construct the cache store selected by `config`.
pub fn build_cache_store(config: &CacheConfig) -> DomainResult<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(MokaCacheStore::with_capacity(config.max_capacity))),
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                DomainError::CacheError("redis backend selected without cache.redis_url".to_string())
            })?;
            Ok(Arc::new(RedisCacheStore::from_url(url)?))
        }
    }
}
