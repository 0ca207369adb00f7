//! footfall configuration.
//!
//! TOML-based configuration with validation. Every section has defaults,
//! so an empty file (or none at all) yields a working server.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{FootfallConfig, GeoConfig, LoggingConfig, PresenceConfig, ServerConfig};
pub use toml_loader::{create_default_config, default_config_path, load_default, load_from_path};

use footfall_common::ConfigError;
use std::path::Path;

/// Load from `path` when given, else from the platform default location.
pub fn load_config(path: Option<&Path>) -> Result<FootfallConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => load_default(),
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &FootfallConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
