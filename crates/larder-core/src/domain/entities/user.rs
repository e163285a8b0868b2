//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local user record, linked to the identity provider by `keycloak_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Subject claim of the identity provider token.
    pub keycloak_id: String,

    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user for an identity seen for the first time.
    #[must_use]
    pub fn provision(
        keycloak_id: String,
        username: String,
        email: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            keycloak_id,
            username,
            email,
            first_name,
            last_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the user's full name.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }

    /// Returns the display name (full name or username).
    #[must_use]
    pub fn display_name(&self) -> String {
        self.full_name().unwrap_or_else(|| self.username.clone())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
