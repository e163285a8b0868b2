//! Validates bearer tokens issued by the identity provider.

use super::Claims;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use larder_config::SecurityConfig;
use larder_core::{LarderError, LarderResult};
use tracing::{debug, warn};

/// Bearer token validator.
///
/// Uses RS256 with the realm public key when one is configured, otherwise
/// HS256 with the shared secret. Issuer and audience are checked only when
/// configured.
#[derive(Clone)]
pub struct TokenProvider {
    decoding_key: DecodingKey,
    encoding_key: Option<EncodingKey>,
    validation: Validation,
}

impl TokenProvider {
    pub fn new(config: &SecurityConfig) -> LarderResult<Self> {
        let (algorithm, decoding_key, encoding_key) = match (&config.jwt_public_key, &config.jwt_secret) {
            (Some(pem), _) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| LarderError::Configuration(format!("Invalid JWT public key: {e}")))?;
                (Algorithm::RS256, key, None)
            }
            (None, Some(secret)) => (
                Algorithm::HS256,
                DecodingKey::from_secret(secret.as_bytes()),
                Some(EncodingKey::from_secret(secret.as_bytes())),
            ),
            (None, None) => {
                return Err(LarderError::Configuration(
                    "No JWT secret or public key configured".to_string(),
                ))
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        match &config.jwt_issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &config.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            encoding_key,
            validation,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> LarderResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => LarderError::TokenExpired,
                ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                    LarderError::InvalidToken("Invalid token signature".to_string())
                }
                ErrorKind::InvalidIssuer => LarderError::InvalidToken("Invalid token issuer".to_string()),
                ErrorKind::InvalidAudience => {
                    LarderError::InvalidToken("Invalid token audience".to_string())
                }
                _ => LarderError::InvalidToken(e.to_string()),
            }
        })?;

        debug!(sub = %token_data.claims.sub, "Token validated");
        Ok(token_data.claims)
    }

    /// Signs claims with the shared secret. Only available in HS256 mode,
    /// which is used for local development and tests.
    pub fn sign(&self, claims: &Claims) -> LarderResult<String> {
        let key = self.encoding_key.as_ref().ok_or_else(|| {
            LarderError::Configuration("Token signing requires a shared secret".to_string())
        })?;
        encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|e| LarderError::Internal(format!("Failed to sign token: {e}")))
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const SECRET: &str = "test-secret-key-for-testing-only";

    fn config() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: Some(SECRET.to_string()),
            jwt_issuer: Some("https://auth.example.com/realms/larder".to_string()),
            ..Default::default()
        }
    }

    fn claims(exp_offset: Duration, iss: &str) -> Claims {
        let now = Utc::now();
        Claims {
            sub: "kc-123".to_string(),
            preferred_username: Some("jane".to_string()),
            email: Some("jane@example.com".to_string()),
            given_name: None,
            family_name: None,
            exp: (now + exp_offset).timestamp(),
            iat: now.timestamp(),
            iss: Some(iss.to_string()),
            aud: None,
        }
    }

    #[test]
    fn test_sign_and_validate() {
        let provider = TokenProvider::new(&config()).unwrap();
        let token = provider
            .sign(&claims(Duration::hours(1), "https://auth.example.com/realms/larder"))
            .unwrap();

        let validated = provider.validate_token(&token).unwrap();
        assert_eq!(validated.sub, "kc-123");
        assert_eq!(validated.username(), "jane");
    }

    #[test]
    fn test_expired_token() {
        let provider = TokenProvider::new(&config()).unwrap();
        let token = provider
            .sign(&claims(Duration::hours(-2), "https://auth.example.com/realms/larder"))
            .unwrap();
        assert!(matches!(provider.validate_token(&token), Err(LarderError::TokenExpired)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let provider = TokenProvider::new(&config()).unwrap();
        let token = provider.sign(&claims(Duration::hours(1), "https://evil.example.com")).unwrap();
        let err = provider.validate_token(&token).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let provider = TokenProvider::new(&config()).unwrap();
        assert!(provider.validate_token("invalid-token").is_err());
    }

    #[test]
    fn test_missing_key_material() {
        let err = TokenProvider::new(&SecurityConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_invalid_public_key_rejected() {
        let config = SecurityConfig {
            jwt_public_key: Some("not a key".to_string()),
            ..Default::default()
        };
        assert!(TokenProvider::new(&config).is_err());
    }
}
