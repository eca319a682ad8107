// Cache-aside fetcher.
// Serves from the store when possible, otherwise computes and writes back.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::github::Failure;

use super::store::CacheStore;

/// Whether a response came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return the cached value for `key`, or compute it and cache it for `ttl`.
///
/// Store failures never fail the call: a read error counts as a miss and a
/// write error only loses the cache entry. A failed `compute` is returned
/// unchanged and nothing is stored.
pub async fn get_or_compute<T, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<(T, CacheStatus), Failure>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    match store.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                return Ok((value, CacheStatus::Hit));
            }
            Err(e) => tracing::warn!(key, error = %e, "discarding unreadable cache entry"),
        },
        Ok(None) => tracing::debug!(key, "cache miss"),
        Err(e) => tracing::warn!(key, error = %e, "cache read failed, fetching fresh"),
    }

    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(e) = store.set_with_ttl(key, raw, ttl).await {
                tracing::warn!(key, error = %e, "cache write failed");
            }
        }
        Err(e) => tracing::warn!(key, error = %e, "value not serializable, not cached"),
    }

    Ok((value, CacheStatus::Miss))
}
