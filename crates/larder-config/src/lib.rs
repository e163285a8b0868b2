//! # Larder Config
//!
//! Layered configuration for Larder: TOML files per environment, local
//! overrides and `LARDER__` environment variables, validated at startup.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
