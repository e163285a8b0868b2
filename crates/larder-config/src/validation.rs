//! Configuration validation.
//!
//! Collects every problem in the loaded configuration so startup fails once
//! with the full list instead of one error at a time.

use crate::{AppConfig, CacheBackend};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Neither an HS256 secret nor an RS256 public key is configured.
    MissingTokenKey,
    /// HS256 secret is too short.
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Public key is not PEM encoded.
    InvalidPublicKey,
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    PoolSizeTooLarge { value: u32, maximum: u32 },
    InvalidUrl { url_type: String, message: String },
    NonPositiveTimeout { name: String, value: u64 },
    NonPositiveLimit { name: String },
    InvalidLogLevel { value: String },
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTokenKey => {
                write!(f, "Either security.jwt_secret or security.jwt_public_key must be set")
            }
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(f, "JWT secret too short: {actual} characters (minimum {minimum})")
            }
            Self::InvalidPublicKey => {
                write!(f, "security.jwt_public_key must be a PEM encoded public key")
            }
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {name}: {value} (must be 1-65535)")
            }
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({min}) cannot be greater than max ({max})")
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {value} exceeds maximum allowed ({maximum})")
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {url_type} URL: {message}")
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{name}' must be positive, got {value}")
            }
            Self::NonPositiveLimit { name } => write!(f, "Limit '{name}' must be positive"),
            Self::InvalidLogLevel { value } => {
                write!(f, "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)")
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{value}' (valid: pretty, json)")
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    const MAX_POOL_SIZE: u32 = 1000;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];

    /// Validates the entire application configuration.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_security(config, &mut errors);
        Self::validate_server(config, &mut errors);
        Self::validate_database(config, &mut errors);
        Self::validate_cache(config, &mut errors);
        Self::validate_open_food_facts(config, &mut errors);
        Self::validate_observability(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_security(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let security = &config.security;
        match (&security.jwt_public_key, &security.jwt_secret) {
            (Some(pem), _) => {
                if !pem.contains("-----BEGIN") {
                    errors.push(ConfigValidationError::InvalidPublicKey);
                }
            }
            (None, Some(secret)) => {
                if secret.len() < Self::MIN_JWT_SECRET_LENGTH {
                    errors.push(ConfigValidationError::JwtSecretTooShort {
                        actual: secret.len(),
                        minimum: Self::MIN_JWT_SECRET_LENGTH,
                    });
                }
            }
            (None, None) => errors.push(ConfigValidationError::MissingTokenKey),
        }
    }

    fn validate_server(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let server = &config.server;
        if server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: server.port,
            });
        }
        if server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
                value: 0,
            });
        }
        if server.max_body_size == 0 {
            errors.push(ConfigValidationError::NonPositiveLimit {
                name: "server.max_body_size".to_string(),
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let database = &config.database;
        if database.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !database.url.starts_with("postgres://") && !database.url.starts_with("postgresql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with postgres:// or postgresql://".to_string(),
            });
        }

        if database.min_connections > database.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: database.min_connections,
                max: database.max_connections,
            });
        }
        if database.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: database.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
        if database.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_cache(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let cache = &config.cache;
        if cache.max_body_bytes == 0 {
            errors.push(ConfigValidationError::NonPositiveLimit {
                name: "cache.max_body_bytes".to_string(),
            });
        }
        if cache.backend == CacheBackend::Memory && cache.max_entries == 0 {
            errors.push(ConfigValidationError::NonPositiveLimit {
                name: "cache.max_entries".to_string(),
            });
        }
        if cache.backend != CacheBackend::Redis {
            return;
        }

        if !cache.redis_url.starts_with("redis://") && !cache.redis_url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }
        if cache.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: cache.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_open_food_facts(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let off = &config.open_food_facts;
        if let Err(e) = Url::parse(&off.base_url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "open_food_facts".to_string(),
                message: e.to_string(),
            });
        }
        if off.timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "open_food_facts.timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_observability(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let observability = &config.observability;
        let level = observability.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: observability.log_level.clone(),
            });
        }
        let format = observability.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: observability.log_format.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("\n  {}. {}", i + 1, error));
    }
    output
}
