// Normalized API errors.
// Maps upstream failures to the `{status, detail, extra}` shape clients branch on.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::github::Failure;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const USERNAME_INVALID: &str = "Username is invalid";

/// Error body rendered for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
    pub extra: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            extra: Map::new(),
        }
    }

    /// Missing or blank handle.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, detail)
    }

    /// The administrative flush could not reach the cache backend.
    pub fn cache_unavailable() -> Self {
        Self::new(500, "failed to clear cache")
    }

    /// Anything unexpected at the request boundary.
    pub fn internal() -> Self {
        Self::new(500, "internal server error")
    }

    fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Shape an upstream failure for the client.
pub fn normalize(failure: &Failure) -> ApiError {
    match failure {
        Failure::Transport { .. } => ApiError::new(500, "failed to reach upstream"),
        Failure::Status {
            status, headers, ..
        } => match *status {
            404 => ApiError::new(404, "resource not found"),
            429 => {
                let remaining = headers
                    .get("x-ratelimit-remaining")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("0");
                ApiError::new(429, "rate limit exceeded").with_extra("remaining", remaining)
            }
            400 => ApiError::new(400, "invalid upstream request"),
            other => ApiError::new(other, "upstream API error"),
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "detail": self }))).into_response()
    }
}
