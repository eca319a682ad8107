// Cache module.
// TTL key-value stores and the cache-aside policy built on top of them.

pub mod fetcher;
pub mod redis_store;
pub mod store;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

pub use fetcher::{CacheStatus, get_or_compute};
pub use redis_store::RedisStore;
pub use store::{CacheError, CacheStore, DEFAULT_TTL, MemoryStore};

/// Pick the cache backend for the given configuration.
pub fn store_from_config(config: &Config) -> Result<Arc<dyn CacheStore>> {
    match &config.redis {
        Some(redis) => {
            tracing::info!(host = %redis.host, port = redis.port, "using Redis cache");
            Ok(Arc::new(RedisStore::new(redis)?))
        }
        None => {
            tracing::info!("REDIS_HOST not set, using in-process cache");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
