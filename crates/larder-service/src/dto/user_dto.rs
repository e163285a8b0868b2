//! User-related DTOs.

use chrono::{DateTime, Utc};
use larder_core::{User, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to update the current user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 64))]
    pub first_name: Option<String>,

    #[validate(length(max = 64))]
    pub last_name: Option<String>,
}

impl UpdateUserRequest {
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if self.email.is_some() {
            user.email = self.email;
        }
        if self.first_name.is_some() {
            user.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            user.last_name = self.last_name;
        }
        user.touch();
    }
}

/// User response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub keycloak_id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let display_name = user.display_name();
        Self {
            id: user.id,
            keycloak_id: user.keycloak_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            display_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public view of another user, as shown in group member lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::provision(
            "kc-1".to_string(),
            "ada".to_string(),
            None,
            Some("Ada".to_string()),
            Some("Lovelace".to_string()),
        )
    }

    #[test]
    fn test_update_request_validation() {
        let request = UpdateUserRequest {
            email: Some("not-an-email".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_err());

        let request = UpdateUserRequest {
            username: Some("ab".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_err());

        let request = UpdateUserRequest {
            email: Some("ada@example.com".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_keeps_absent_fields() {
        let mut user = user();
        UpdateUserRequest {
            email: Some("ada@example.com".to_string()),
            ..UpdateUserRequest::default()
        }
        .apply(&mut user);

        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.username, "ada");
    }

    #[test]
    fn test_user_response_from_user() {
        let user = user();
        let response = UserResponse::from(user.clone());
        assert_eq!(response.id, user.id);
        assert_eq!(response.display_name, "Ada Lovelace");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["keycloakId"], "kc-1");
    }
}
