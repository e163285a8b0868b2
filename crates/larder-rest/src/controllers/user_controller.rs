//! Current user controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    middleware::HttpCache,
    responses::{no_content, ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch},
    Router,
};
use larder_service::{UpdateUserRequest, UserResponse};
use tracing::debug;

/// Entries derived from the caller's account.
const EVICT_ME: [&str; 2] = ["user_me:{userId}*", "user_keycloak:{keycloakId}"];

pub fn router(cache: &HttpCache) -> Router<AppState> {
    Router::new().route(
        "/me",
        cache
            .cached(get(get_current_user), "user_me", 300)
            .merge(cache.evicting(patch(update_current_user), EVICT_ME))
            .merge(cache.evicting(delete(delete_current_user), EVICT_ME)),
    )
}

/// The caller's account.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<UserResponse> {
    ok(state.user_service.get_current(user.id).await?)
}

/// Update the caller's profile fields.
#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    debug!("Update profile request: {}", user.username);
    ok(state.user_service.update_current(user.id, request).await?)
}

/// Delete the caller's account and everything it owns.
#[utoipa::path(
    delete,
    path = "/users/me",
    tag = "users",
    responses((status = 204, description = "Account deleted")),
    security(("bearer_auth" = []))
)]
pub async fn delete_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<StatusCode, AppError> {
    state.user_service.delete_current(user.id).await?;
    Ok(no_content())
}
