//! User service trait definition.

use crate::dto::{UpdateUserRequest, UserResponse};
use async_trait::async_trait;
use larder_core::{Interface, LarderResult, UserId};
use larder_security::{Claims, CurrentUser};

/// User service trait.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Maps validated token claims to the local user, provisioning it on
    /// first sight.
    async fn resolve_identity(&self, claims: &Claims) -> LarderResult<CurrentUser>;

    async fn get_current(&self, user_id: UserId) -> LarderResult<UserResponse>;

    async fn update_current(&self, user_id: UserId, request: UpdateUserRequest) -> LarderResult<UserResponse>;

    /// Deletes the user's account and everything it owns.
    async fn delete_current(&self, user_id: UserId) -> LarderResult<()>;
}
