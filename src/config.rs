// Service configuration.
// Reads upstream, cache backend and listener settings from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ProxyError, Result};

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Connection settings for the Redis cache backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

/// Runtime configuration for the proxy.
#[derive(Clone)]
pub struct Config {
    /// Base URL that relative upstream paths are joined onto.
    pub api_url: String,
    /// Bearer credential attached to every upstream request.
    pub token: String,
    /// Per-request upstream timeout.
    pub timeout: Duration,
    /// Redis backend, or `None` to use the in-process store.
    pub redis: Option<RedisConfig>,
    /// The single origin allowed by CORS.
    pub allowed_origin: String,
    pub listen_addr: SocketAddr,
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("redis", &self.redis.as_ref().map(|r| (&r.host, r.port)))
            .field("allowed_origin", &self.allowed_origin)
            .field("listen_addr", &self.listen_addr)
            .finish()
    }
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Treat empty values the same as unset ones.
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = var("GITHUB_TOKEN").ok_or(ProxyError::MissingToken)?;

        let api_url = var("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout = match var("GITHUB_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_env("GITHUB_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let redis = match var("REDIS_HOST") {
            Some(host) => {
                let port = match var("REDIS_PORT") {
                    Some(raw) => parse_env("REDIS_PORT", &raw)?,
                    None => DEFAULT_REDIS_PORT,
                };
                Some(RedisConfig {
                    host,
                    port,
                    password: var("REDIS_PASSWORD"),
                })
            }
            None => None,
        };

        let allowed_origin =
            var("ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        let listen_addr = parse_env(
            "LISTEN_ADDR",
            &var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;

        Ok(Self {
            api_url,
            token,
            timeout,
            redis,
            allowed_origin,
            listen_addr,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| ProxyError::InvalidEnv {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("GITHUB_TOKEN", "secret")])).unwrap();

        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.token, "secret");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.redis.is_none());
        assert_eq!(config.allowed_origin, "http://localhost:3000");
        assert_eq!(config.listen_addr, "0.0.0.0:8000".parse().unwrap());
    }

    #[test]
    fn test_missing_token() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ProxyError::MissingToken));

        let err = Config::from_lookup(lookup(&[("GITHUB_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, ProxyError::MissingToken));
    }

    #[test]
    fn test_redis_settings() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "secret"),
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_PASSWORD", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(
            config.redis,
            Some(RedisConfig {
                host: "cache.internal".to_string(),
                port: 6380,
                password: Some("hunter2".to_string()),
            })
        );
    }

    #[test]
    fn test_redis_port_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "secret"),
            ("REDIS_HOST", "localhost"),
        ]))
        .unwrap();

        let redis = config.redis.unwrap();
        assert_eq!(redis.port, 6379);
        assert_eq!(redis.password, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "secret"),
            ("REDIS_HOST", "localhost"),
            ("REDIS_PORT", "not-a-port"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ProxyError::InvalidEnv { name: "REDIS_PORT", .. }));
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "secret"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::from_lookup(lookup(&[("GITHUB_TOKEN", "secret")])).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
