//! Process startup: logging and the startup summary.

use larder_config::{ObservabilityConfig, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter applied when neither `RUST_LOG` nor the configured level parse.
const FALLBACK_FILTER: &str = "info,larder=debug,tower_http=debug";

/// Builds the log filter. `RUST_LOG` wins over the configured level.
#[must_use]
pub fn log_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},tower_http=debug", config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Installs the global subscriber. Calling it twice is a no-op.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(log_filter(config));

    let result = if config.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Logs where the server can be reached.
pub fn log_startup_info(server: &ServerConfig) {
    let base = format!("http://{}", server.addr());
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  {}/api/v1", base);
    info!("Health:    {}/health", base);
    info!("Readiness: {}/ready", base);
    info!("API Docs:  {}/swagger-ui", base);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_accepts_configured_level() {
        let config = ObservabilityConfig {
            log_level: "warn".to_string(),
            log_format: "pretty".to_string(),
        };
        let filter = log_filter(&config).to_string();
        assert!(filter.contains("warn") || std::env::var("RUST_LOG").is_ok());
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        let config = ObservabilityConfig::default();
        init_logging(&config);
        init_logging(&config);
        log_startup_info(&ServerConfig::default());
    }
}
