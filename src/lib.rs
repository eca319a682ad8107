// ghproxy library crate.
// Cache-aside proxy in front of the GitHub REST API.

pub mod analyze;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod service;

use std::sync::Arc;

use axum::Router;

pub use config::Config;
pub use error::{ProxyError, Result};
pub use service::ProxyService;

/// Assemble the full application from configuration.
pub fn build_app(config: &Config) -> Result<Router> {
    let upstream = Arc::new(github::GitHubClient::from_config(config)?);
    let cache = cache::store_from_config(config)?;
    let service = ProxyService::new(upstream, cache);
    api::router(service, &config.allowed_origin)
}
