//! The identity attached to an authenticated request.

use larder_core::UserId;
use serde::{Deserialize, Serialize};

/// Resolved caller of a request: the local user plus the token subject.
///
/// Inserted into request extensions by the auth middleware, read by
/// extractors and by the response cache to scope keys per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub keycloak_id: String,
    pub username: String,
}

impl CurrentUser {
    #[must_use]
    pub fn new(id: UserId, keycloak_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            keycloak_id: keycloak_id.into(),
            username: username.into(),
        }
    }
}
