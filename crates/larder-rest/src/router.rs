//! Main application router.

use crate::{
    controllers::{
        food_controller, group_controller, health_controller, meal_controller, pantry_controller,
        shopping_list_controller, user_controller,
    },
    middleware::{auth_middleware, logging_middleware, AuthMiddlewareState},
    openapi::ApiDoc,
    state::AppState,
};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use larder_config::ServerConfig;
use larder_security::TokenProvider;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the application router.
///
/// API routes live under `/api/v1` behind the auth middleware; health checks,
/// Swagger UI and the OpenAPI document are served at the root.
pub fn create_router(state: AppState, token_provider: Arc<TokenProvider>, server_config: &ServerConfig) -> Router {
    let auth_state = AuthMiddlewareState::new(token_provider, state.user_service.clone());
    let cache = state.http_cache.clone();

    let api_router = Router::new()
        .nest("/foods", food_controller::router(&cache))
        .nest("/pantries", pantry_controller::router(&cache))
        .nest("/shopping-list-items", shopping_list_controller::router(&cache))
        .nest("/meals", meal_controller::router(&cache))
        .nest("/groups", group_controller::router(&cache))
        .nest("/users", user_controller::router(&cache))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let router = Router::new()
        .merge(health_controller::router())
        .nest("/api/v1", api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server_config.max_body_size))
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(create_cors_layer(server_config))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with REST endpoints and Swagger UI at /swagger-ui");
    router
}

fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }
    if server_config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> &'static str {
    "Larder API v1"
}
