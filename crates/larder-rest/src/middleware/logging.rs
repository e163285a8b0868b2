//! Request logging middleware.

use super::CACHE_STATUS;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Logs one line per request with its status, latency and cache outcome.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let cache = response
        .headers()
        .get(CACHE_STATUS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    info!(
        target: "http",
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        cache,
        "HTTP request completed"
    );

    response
}
