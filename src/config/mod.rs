//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)            FORUM_BACKEND_API
//!     → loader.rs (parse)  ─────────→ base_url override
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → consumed once by ApiClient::from_config
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The environment wins over the file for the base target

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_default, ConfigError, BASE_URL_ENV};
pub use schema::{
    ApiConfig, ClientConfig, CredentialBackend, CredentialConfig, FallbackConfig,
    ObservabilityConfig,
};
