// GitHub API HTTP client.
// Handles authentication, URL resolution and mapping responses to outcomes.

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;

use crate::config::Config;
use crate::error::{ProxyError, Result};

use super::types::{Failure, Outcome, Success};

const GITHUB_API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = concat!("ghproxy/", env!("CARGO_PKG_VERSION"));

/// Narrow view of the upstream API: authenticated GETs and nothing else.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// GET `path` with optional query parameters.
    ///
    /// `path` is either relative to the API base URL (`/users/octocat`) or an
    /// absolute URL taken from a previous response (`repos_url`,
    /// `languages_url`).
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Outcome;
}

/// GitHub API client with bearer authentication.
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client against `base_url` with the given token.
    pub fn new(base_url: &str, token: &str, timeout: std::time::Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ProxyError::Other(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the service configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, &config.token, config.timeout)
    }

    /// Resolve a relative path or pass an absolute URL through unchanged.
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Check response status and convert to an outcome.
    async fn into_outcome(response: Response) -> Outcome {
        let status = response.status();

        if status.is_success() {
            return match response.json::<Value>().await {
                Ok(body) => Ok(Success {
                    status: status.as_u16(),
                    body,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable upstream body");
                    Err(Failure::transport(format!("invalid upstream body: {}", e)))
                }
            };
        }

        let headers = response.headers().clone();
        let reason = status.canonical_reason().unwrap_or("unknown status");

        // GitHub puts a human readable explanation in the `message` field.
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| reason.to_string());

        Err(Failure::Status {
            status: status.as_u16(),
            message,
            headers,
        })
    }
}

#[async_trait]
impl Upstream for GitHubClient {
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Outcome {
        let url = self.url_for(path);

        let response = match self.client.get(&url).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "upstream request failed");
                return Err(Failure::transport(e.to_string()));
            }
        };

        if let Some(remaining) = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
        {
            tracing::debug!(url = %url, status = response.status().as_u16(), remaining, "upstream response");
        }

        Self::into_outcome(response).await
    }
}
