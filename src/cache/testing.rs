// Cache store doubles for tests.

use std::time::Duration;

use async_trait::async_trait;

use super::store::{CacheError, CacheStore};

/// Store whose every operation fails, like a Redis server that is down.
pub struct UnavailableStore;

#[async_trait]
impl CacheStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: String,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}
