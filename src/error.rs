// Error types for the ghproxy service.
// Covers startup failures: configuration, client construction and serving.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing GITHUB_TOKEN environment variable")]
    MissingToken,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
