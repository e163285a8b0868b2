//! Claims carried by identity provider access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The subset of OIDC access token claims Larder relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity provider's user id.
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Expiration timestamp.
    pub exp: i64,

    /// Issued at timestamp.
    #[serde(default)]
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
}

impl Claims {
    /// Username to provision a local account with; falls back to the subject.
    #[must_use]
    pub fn username(&self) -> &str {
        self.preferred_username.as_deref().unwrap_or(&self.sub)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keycloak_token_payload() {
        let payload = serde_json::json!({
            "exp": 4_102_444_800_i64,
            "iat": 1_700_000_000_i64,
            "iss": "https://auth.example.com/realms/larder",
            "aud": ["larder-api", "account"],
            "sub": "f4c1a7b2-0000-4000-8000-000000000001",
            "typ": "Bearer",
            "preferred_username": "jane",
            "email": "jane@example.com",
            "given_name": "Jane",
            "family_name": "Doe"
        });
        let claims: Claims = serde_json::from_value(payload).unwrap();
        assert_eq!(claims.username(), "jane");
        assert_eq!(claims.given_name.as_deref(), Some("Jane"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_username_falls_back_to_subject() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "abc",
            "exp": 0
        }))
        .unwrap();
        assert_eq!(claims.username(), "abc");
        assert!(claims.is_expired());
    }
}
