//! Request identity extractors.

use crate::responses::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use larder_core::LarderError;
use larder_security::CurrentUser;

/// The resolved caller. Rejects with 401 when the request carried no valid
/// bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError(LarderError::unauthorized("Authentication required")))
    }
}

/// The resolved caller, if any.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl std::ops::Deref for OptionalUser {
    type Target = Option<CurrentUser>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
