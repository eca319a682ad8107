// HTTP routes.
// Wires the proxy service to axum handlers and applies the shared response headers.

use std::any::Any;

use axum::extract::{Path, Request, State};
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyHeader, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::CacheStatus;
use crate::error::{ProxyError, Result};
use crate::service::ProxyService;

use super::error::{ApiError, USERNAME_REQUIRED};

/// Build the application router.
pub fn router(service: ProxyService, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin).map_err(|_| ProxyError::InvalidEnv {
        name: "ALLOWED_ORIGIN",
        value: allowed_origin.to_string(),
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AnyHeader);

    let app = Router::new()
        .route("/identity", get(missing_handle))
        .route("/identity/", get(missing_handle))
        .route("/identity/{handle}", get(identity))
        .route("/identity/{handle}/analysis", get(analysis))
        .route("/cache", post(clear_cache))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(no_cache_headers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    Ok(app)
}

async fn identity(
    State(service): State<ProxyService>,
    Path(handle): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let (body, status) = service.identity(&handle).await?;
    Ok(cached_json(body, status))
}

async fn analysis(
    State(service): State<ProxyService>,
    Path(handle): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let (body, status) = service.analysis(&handle).await?;
    Ok(cached_json(body, status))
}

async fn clear_cache(
    State(service): State<ProxyService>,
) -> std::result::Result<Json<Value>, ApiError> {
    service.clear_cache().await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn missing_handle() -> ApiError {
    ApiError::bad_request(USERNAME_REQUIRED)
}

async fn not_found() -> ApiError {
    ApiError::new(404, "resource not found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(405, "method not allowed")
}

fn cached_json<T: Serialize>(body: T, status: CacheStatus) -> Response {
    ([("x-cache", status.as_str())], Json(body)).into_response()
}

/// Responses are never cacheable by clients or intermediaries.
async fn no_cache_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = message, "request handler panicked");
    ApiError::internal().into_response()
}
