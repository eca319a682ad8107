// GitHub API endpoint functions.
// Typed wrappers over `Upstream::fetch` for the three calls the proxy makes.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::Upstream;
use super::types::{Failure, Identity, LanguageBreakdown, RepoRef};

/// Upstream page size cap for repository listings.
pub const REPOS_PER_PAGE: u32 = 100;

/// Path of the identity record for `handle`.
pub fn user_path(handle: &str) -> String {
    format!("/users/{}", handle)
}

/// Get the raw identity record for a handle.
pub async fn get_user(upstream: &dyn Upstream, handle: &str) -> Result<Value, Failure> {
    fetch_body(upstream, &user_path(handle), &[]).await
}

/// Get the identity record for a handle, keeping only the fields the analyzer uses.
pub async fn get_identity(upstream: &dyn Upstream, handle: &str) -> Result<Identity, Failure> {
    let body = get_user(upstream, handle).await?;
    decode(body, "identity record")
}

/// Get the first page of repositories from a `repos_url`.
///
/// Only one page of `REPOS_PER_PAGE` entries is requested; repositories past
/// it are not returned.
pub async fn get_repos(upstream: &dyn Upstream, repos_url: &str) -> Result<Vec<RepoRef>, Failure> {
    let per_page = REPOS_PER_PAGE.to_string();
    let body = fetch_body(upstream, repos_url, &[("per_page", per_page.as_str())]).await?;
    decode(body, "repository list")
}

/// Get the language byte breakdown from a `languages_url`.
pub async fn get_languages(
    upstream: &dyn Upstream,
    languages_url: &str,
) -> Result<LanguageBreakdown, Failure> {
    let body = fetch_body(upstream, languages_url, &[]).await?;
    decode(body, "language breakdown")
}

async fn fetch_body(
    upstream: &dyn Upstream,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Value, Failure> {
    let response = upstream.fetch(path, query).await?;
    tracing::debug!(path, status = response.status, "upstream ok");
    Ok(response.body)
}

fn decode<T: DeserializeOwned>(body: Value, what: &str) -> Result<T, Failure> {
    serde_json::from_value(body)
        .map_err(|e| Failure::transport(format!("malformed {}: {}", what, e)))
}
