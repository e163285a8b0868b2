//! Bearer token authentication.

use crate::responses::AppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use larder_security::TokenProvider;
use larder_service::UserService;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub token_provider: Arc<TokenProvider>,
    pub user_service: Arc<dyn UserService>,
}

impl AuthMiddlewareState {
    pub fn new(token_provider: Arc<TokenProvider>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            token_provider,
            user_service,
        }
    }
}

/// Resolves the caller from the `Authorization` header.
///
/// A valid token is mapped to the internal user, which is stored in the
/// request extensions as a `CurrentUser`. Missing or invalid tokens leave the
/// request anonymous; handlers that need a caller reject it themselves.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.token_provider.validate_token(&token) {
            Ok(claims) => match state.user_service.resolve_identity(&claims).await {
                Ok(user) => {
                    debug!(user_id = %user.id, "Authenticated user: {}", user.username);
                    request.extensions_mut().insert(user);
                }
                Err(e) => return AppError(e).into_response(),
            },
            Err(e) => debug!("Token validation failed: {}", e),
        }
    }

    next.run(request).await
}
