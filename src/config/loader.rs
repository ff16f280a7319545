//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "FORUM_BACKEND_API";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ClientConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    finish(config, std::env::var(BASE_URL_ENV).ok())
}

/// Defaults plus environment overrides, validated. Used when no file is given.
pub fn load_default() -> Result<ClientConfig, ConfigError> {
    finish(ClientConfig::default(), std::env::var(BASE_URL_ENV).ok())
}

fn finish(mut config: ClientConfig, base_url: Option<String>) -> Result<ClientConfig, ConfigError> {
    apply_base_url_override(&mut config, base_url);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// An empty override is ignored so an unset-but-exported variable keeps the file value.
fn apply_base_url_override(config: &mut ClientConfig, base_url: Option<String>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!(base_url = %url, "Base URL overridden from environment");
        config.api.base_url = url.trim().to_string();
    }
}
