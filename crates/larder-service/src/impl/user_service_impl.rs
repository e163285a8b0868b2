//! User service implementation.

use crate::cache::{cache_keys, CacheExt, CacheInterface, IDENTITY_TTL};
use crate::dto::{UpdateUserRequest, UserResponse};
use crate::user_service::UserService;
use async_trait::async_trait;
use larder_core::{LarderError, LarderResult, User, UserId, ValidateExt};
use larder_repository::UserRepository;
use larder_security::{Claims, CurrentUser};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct UserServiceImpl {
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheInterface>,
}

impl UserServiceImpl {
    pub fn new(users: Arc<dyn UserRepository>, cache: Arc<dyn CacheInterface>) -> Self {
        Self { users, cache }
    }

    async fn find_or_provision(&self, claims: &Claims) -> LarderResult<CurrentUser> {
        if let Some(user) = self.users.find_by_keycloak_id(&claims.sub).await? {
            return Ok(CurrentUser::new(user.id, user.keycloak_id, user.username));
        }

        let user = User::provision(
            claims.sub.clone(),
            claims.username().to_string(),
            claims.email.clone(),
            claims.given_name.clone(),
            claims.family_name.clone(),
        );

        let saved = match self.users.save(&user).await {
            Ok(saved) => saved,
            // A concurrent first request for the same subject won the insert.
            Err(LarderError::Conflict(_)) => self
                .users
                .find_by_keycloak_id(&claims.sub)
                .await?
                .ok_or_else(|| LarderError::internal("User vanished after provisioning conflict"))?,
            Err(e) => return Err(e),
        };

        info!(user_id = %saved.id, keycloak_id = %saved.keycloak_id, "Provisioned user");
        Ok(CurrentUser::new(saved.id, saved.keycloak_id, saved.username))
    }

    async fn load(&self, user_id: UserId) -> LarderResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| LarderError::not_found("User", user_id))
    }

    async fn forget_identity(&self, keycloak_id: &str) {
        if let Err(e) = self.cache.delete(&cache_keys::user_by_keycloak_id(keycloak_id)).await {
            warn!(error = %e, "Failed to drop cached identity");
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn resolve_identity(&self, claims: &Claims) -> LarderResult<CurrentUser> {
        let key = cache_keys::user_by_keycloak_id(&claims.sub);
        self.cache
            .get_or_set(&key, Some(IDENTITY_TTL), || self.find_or_provision(claims))
            .await
    }

    async fn get_current(&self, user_id: UserId) -> LarderResult<UserResponse> {
        debug!("Getting user: {}", user_id);
        Ok(UserResponse::from(self.load(user_id).await?))
    }

    async fn update_current(&self, user_id: UserId, request: UpdateUserRequest) -> LarderResult<UserResponse> {
        debug!("Updating user: {}", user_id);

        request.validate_request()?;

        let mut user = self.load(user_id).await?;
        request.apply(&mut user);
        let updated = self.users.update(&user).await?;

        self.forget_identity(&updated.keycloak_id).await;

        info!("User updated: {}", user_id);
        Ok(UserResponse::from(updated))
    }

    async fn delete_current(&self, user_id: UserId) -> LarderResult<()> {
        debug!("Deleting user: {}", user_id);

        let user = self.load(user_id).await?;
        if !self.users.delete(user_id).await? {
            return Err(LarderError::not_found("User", user_id));
        }

        self.forget_identity(&user.keycloak_id).await;

        info!("User deleted: {}", user_id);
        Ok(())
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::testing::InMemoryDb;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            preferred_username: Some("ada".to_string()),
            email: Some("ada@example.com".to_string()),
            given_name: Some("Ada".to_string()),
            family_name: Some("Lovelace".to_string()),
            exp: 0,
            iat: 0,
            iss: None,
            aud: None,
        }
    }

    fn service(db: &Arc<InMemoryDb>) -> (UserServiceImpl, Arc<MemoryCacheStore>) {
        let cache = Arc::new(MemoryCacheStore::new());
        (UserServiceImpl::new(db.clone(), cache.clone()), cache)
    }

    #[tokio::test]
    async fn test_resolve_identity_provisions_once() {
        let db = InMemoryDb::new();
        let (service, cache) = service(&db);

        let first = service.resolve_identity(&claims("kc-1")).await.unwrap();
        let second = service.resolve_identity(&claims("kc-1")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.username, "ada");
        assert!(cache.exists("user_keycloak:kc-1").await.unwrap());

        let user = service.get_current(first.id).await.unwrap();
        assert_eq!(user.display_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_resolve_identity_finds_existing_user() {
        let db = InMemoryDb::new();
        let existing = db.insert_user("kc-2", "grace");
        let (service, _) = service(&db);

        let current = service.resolve_identity(&claims("kc-2")).await.unwrap();
        assert_eq!(current.id, existing.id);
        assert_eq!(current.username, "grace");
    }

    #[tokio::test]
    async fn test_update_drops_cached_identity() {
        let db = InMemoryDb::new();
        let (service, cache) = service(&db);
        let current = service.resolve_identity(&claims("kc-3")).await.unwrap();

        let updated = service
            .update_current(
                current.id,
                UpdateUserRequest {
                    username: Some("countess".to_string()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "countess");
        assert!(!cache.exists("user_keycloak:kc-3").await.unwrap());

        let again = service.resolve_identity(&claims("kc-3")).await.unwrap();
        assert_eq!(again.username, "countess");
    }

    #[tokio::test]
    async fn test_delete_current() {
        let db = InMemoryDb::new();
        let (service, _) = service(&db);
        let current = service.resolve_identity(&claims("kc-4")).await.unwrap();

        service.delete_current(current.id).await.unwrap();

        let err = service.get_current(current.id).await.unwrap_err();
        assert!(matches!(err, LarderError::NotFound { .. }));
    }
}
