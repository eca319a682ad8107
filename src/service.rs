// Proxy service.
// Endpoint logic shared by the HTTP handlers: validation, cache keys, normalization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::analyze::analyze;
use crate::api::error::{ApiError, USERNAME_INVALID, USERNAME_REQUIRED, normalize};
use crate::cache::{CacheStatus, CacheStore, DEFAULT_TTL, get_or_compute};
use crate::github::endpoints::get_user;
use crate::github::{AnalysisResult, Failure, Upstream};

/// Handle that simulates an upstream rate limit without touching upstream or
/// the cache. GitHub logins cannot contain underscores, so no real account
/// can collide with it.
pub const RATE_LIMIT_SENTINEL: &str = "__ratelimit__";

/// Longest login GitHub accepts.
const MAX_HANDLE_LEN: usize = 39;

/// Cache key for the identity record of `handle`.
pub fn identity_key(handle: &str) -> String {
    format!("identity:{}", handle)
}

/// Cache key for the language analysis of `handle`.
pub fn analysis_key(handle: &str) -> String {
    format!("analysis:{}", handle)
}

/// Shared request state: the upstream client and the cache store.
#[derive(Clone)]
pub struct ProxyService {
    upstream: Arc<dyn Upstream>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ProxyService {
    pub fn new(upstream: Arc<dyn Upstream>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            upstream,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Upstream identity record for `handle`, passed through unchanged.
    pub async fn identity(&self, handle: &str) -> Result<(Value, CacheStatus), ApiError> {
        let handle = validate(handle)?;

        let upstream = self.upstream.as_ref();
        get_or_compute(self.cache.as_ref(), &identity_key(handle), self.ttl, || {
            get_user(upstream, handle)
        })
        .await
        .map_err(|failure| reject(handle, &failure))
    }

    /// Top-language analysis for `handle`.
    pub async fn analysis(&self, handle: &str) -> Result<(AnalysisResult, CacheStatus), ApiError> {
        let handle = validate(handle)?;

        let upstream = self.upstream.as_ref();
        get_or_compute(self.cache.as_ref(), &analysis_key(handle), self.ttl, || {
            analyze(upstream, handle)
        })
        .await
        .map_err(|failure| reject(handle, &failure))
    }

    /// Drop every cached entry.
    pub async fn clear_cache(&self) -> Result<(), ApiError> {
        self.cache.flush_all().await.map_err(|e| {
            tracing::error!(error = %e, "cache flush failed");
            ApiError::cache_unavailable()
        })?;

        tracing::info!("cache flushed");
        Ok(())
    }
}

/// Reject blank or malformed handles and answer the rate-limit sentinel.
///
/// The handle becomes a path segment of an authenticated upstream request,
/// so only GitHub's login alphabet is let through.
fn validate(handle: &str) -> Result<&str, ApiError> {
    if handle.trim().is_empty() {
        return Err(ApiError::bad_request(USERNAME_REQUIRED));
    }
    if handle == RATE_LIMIT_SENTINEL {
        return Err(normalize(&simulated_rate_limit()));
    }
    if !is_valid_login(handle) {
        tracing::debug!(handle, "rejecting malformed handle");
        return Err(ApiError::bad_request(USERNAME_INVALID));
    }
    Ok(handle)
}

fn is_valid_login(handle: &str) -> bool {
    handle.len() <= MAX_HANDLE_LEN
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn simulated_rate_limit() -> Failure {
    Failure::Status {
        status: 429,
        message: "simulated rate limit".to_string(),
        headers: HeaderMap::new(),
    }
}

fn reject(handle: &str, failure: &Failure) -> ApiError {
    let error = normalize(failure);
    tracing::warn!(
        handle,
        status = error.status,
        upstream = failure.message(),
        "upstream request failed"
    );
    error
}
