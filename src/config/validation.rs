//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but cannot work
//! (unusable base URL, zero timeouts, file store without a path). Every problem
//! is reported, not just the first.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{ClientConfig, CredentialBackend};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.api.base_url.is_empty() {
        match Url::parse(&config.api.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                "api.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("api.base_url", e.to_string())),
        }
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError::new("api.request_timeout_secs", "must be greater than 0"));
    }
    if config.api.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("api.connect_timeout_secs", "must be greater than 0"));
    }

    if config.credentials.backend == CredentialBackend::File
        && config.credentials.path.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::new(
            "credentials.path",
            "required when backend is \"file\"",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://files.example".into();
        config.api.request_timeout_secs = 0;
        config.credentials.backend = CredentialBackend::File;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "api.base_url",
                "api.request_timeout_secs",
                "credentials.path",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "/api".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "api.base_url");
    }
}
