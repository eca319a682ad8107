// Redis-backed cache store.
// Connects lazily so the service starts, and keeps serving, while Redis is down.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;

use crate::config::RedisConfig;
use crate::error::Result;

use super::store::{CacheError, CacheStore};

/// Upper bound on any single Redis round trip, connection setup included.
const OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Cache store on top of a shared Redis connection.
pub struct RedisStore {
    client: redis::Client,
    conn: RwLock<Option<ConnectionManager>>,
}

impl RedisStore {
    /// Build a store for the configured server. Does not connect.
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: redis::RedisConnectionInfo {
                password: config.password.clone(),
                ..Default::default()
            },
        };
        let client = redis::Client::open(info)?;

        Ok(Self {
            client,
            conn: RwLock::new(None),
        })
    }

    /// Return the shared connection, establishing it on first use.
    ///
    /// The lock is only held to read or publish the handle, never while
    /// connecting.
    async fn connection(&self) -> std::result::Result<ConnectionManager, CacheError> {
        if let Some(conn) = self.conn.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let conn = with_timeout(ConnectionManager::new(self.client.clone())).await?;
        tracing::info!("connected to Redis");

        let mut slot = self.conn.write().await;
        // Another request may have won the race; keep the first connection.
        Ok(slot.get_or_insert(conn).clone())
    }
}

async fn with_timeout<T, F>(fut: F) -> std::result::Result<T, CacheError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(OP_TIMEOUT, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Unavailable(format!(
            "no reply from Redis within {:?}",
            OP_TIMEOUT
        ))),
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        with_timeout(conn.get(key)).await
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // Redis rejects an EX of zero.
        let seconds = ttl.as_secs().max(1);
        with_timeout(conn.set_ex(key, value, seconds)).await
    }

    async fn flush_all(&self) -> std::result::Result<(), CacheError> {
        let mut conn = self.connection().await?;
        with_timeout(redis::cmd("FLUSHALL").query_async(&mut conn)).await
    }
}
