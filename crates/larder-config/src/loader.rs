//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use larder_core::LarderError;
use std::path::Path;
use tracing::{debug, info};

/// Loads [`AppConfig`] from a config directory and the process environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: String,
}

impl ConfigLoader {
    pub const ENV_PREFIX: &'static str = "LARDER";

    #[must_use]
    pub fn new(config_dir: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Loader for the default location (`./config`).
    #[must_use]
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Loads configuration for the environment named by `LARDER_ENVIRONMENT`.
    ///
    /// Sources are applied in order:
    /// 1. `{dir}/default.toml`
    /// 2. `{dir}/{environment}.toml`
    /// 3. `{dir}/local.toml` (not committed)
    /// 4. Environment variables such as `LARDER__DATABASE__URL`
    pub fn load(&self) -> Result<AppConfig, LarderError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let environment =
            std::env::var("LARDER_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        self.load_for(&environment)
    }

    /// Loads configuration for an explicit environment name.
    pub fn load_for(&self, environment: &str) -> Result<AppConfig, LarderError> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder().set_default("app.environment", environment)
            .map_err(config_error_to_larder_error)?;

        for name in ["default", environment, "local"] {
            let path = format!("{}/{}.toml", self.config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config file: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(Self::ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_larder_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| LarderError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }
}

fn config_error_to_larder_error(err: ConfigError) -> LarderError {
    LarderError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheBackend;
    use std::fs;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(config.cache.enabled);
        assert_eq!(config.open_food_facts.base_url, "https://world.openfoodfacts.org");
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "default.toml",
            &format!(
                "[server]\nport = 4000\n\n[security]\njwt_secret = \"{SECRET}\"\n\n[cache]\nbackend = \"memory\"\n"
            ),
        );
        write(dir.path(), "staging.toml", "[server]\nport = 5000\n\n[cache]\nbackend = \"redis\"\n");

        let loader = ConfigLoader::new(dir.path().to_string_lossy());
        let config = loader.load_for("staging").unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.app.environment, "staging");
        assert_eq!(config.security.jwt_secret.as_deref(), Some(SECRET));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "default.toml",
            "[security]\njwt_secret = \"short\"\n\n[database]\nurl = \"mysql://nope\"\n",
        );

        let err = ConfigLoader::new(dir.path().to_string_lossy())
            .load_for("test")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JWT secret too short"));
        assert!(message.contains("database"));
    }
}
