//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Live backend settings (base target, timeouts).
    pub api: ApiConfig,

    /// Where the bearer token is read from.
    pub credentials: CredentialConfig,

    /// Offline fallback behavior.
    pub fallback: FallbackConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Live backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL prepended to every request path.
    /// Empty means same-origin: request paths must then be absolute URLs.
    pub base_url: String,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
            user_agent: concat!("forum-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Credential store backend.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// Process-local store; starts empty.
    #[default]
    Memory,
    /// JSON object on disk, re-read on every lookup.
    File,
}

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialConfig {
    /// Which store to use.
    pub backend: CredentialBackend,

    /// Path of the JSON store (required for the file backend).
    pub path: Option<String>,
}

/// Offline fallback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Attach the fallback router. When false, outages reach the caller as errors.
    pub enabled: bool,

    /// Serve post creation from the local data source during an outage.
    pub substitute_writes: bool,

    /// Upper bound of the random delay added to local data source calls.
    pub simulated_latency_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            substitute_writes: false,
            simulated_latency_ms: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
