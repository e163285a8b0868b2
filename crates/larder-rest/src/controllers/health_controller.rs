//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Dependency probe results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: bool,
    pub cache: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Ready when the database answers. The cache store is reported but never
/// blocks readiness: requests are served uncached while it is down.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Database unreachable", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.database.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Readiness: database check failed");
            false
        }
    };
    let cache = match state.cache_store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Readiness: cache store check failed");
            false
        }
    };

    let status = if database { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = ReadinessResponse {
        status: if database { "ready" } else { "not_ready" }.to_string(),
        database,
        cache,
    };
    (status, Json(body))
}

#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses((status = 200, description = "Service is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
