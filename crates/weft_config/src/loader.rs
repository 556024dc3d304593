//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::WeftConfig;
use std::path::Path;

/// Loads and validates `weft.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<WeftConfig, ConfigError> {
    let config_path = project_dir.join("weft.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `weft.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<WeftConfig, ConfigError> {
    let config: WeftConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and option values are usable.
fn validate_config(config: &WeftConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.elaborate.bundle_separator.is_empty() {
        return Err(ConfigError::ValidationError(
            "elaborate.bundle_separator must not be empty".to_string(),
        ));
    }
    if config.elaborate.max_readable_name == 0 {
        return Err(ConfigError::ValidationError(
            "elaborate.max_readable_name must be positive".to_string(),
        ));
    }
    if !config.pdk.install.is_empty() && config.pdk.name.is_none() {
        return Err(ConfigError::MissingField("pdk.name".to_string()));
    }
    Ok(())
}
