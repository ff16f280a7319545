//! Credential stores.
//!
//! # Responsibilities
//! - Expose the persisted bearer token under a fixed key
//! - Reflect writes made by other components on the very next read
//!
//! # Design Decisions
//! - Read-only contract: this crate never writes tokens during requests
//! - No caching; every lookup reads current state
//! - A missing file is an empty store, not an error

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

/// Key under which the bearer token is stored.
pub const TOKEN_KEY: &str = "token";

/// Errors raised while reading a credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credential store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store {path} is not a JSON object of strings: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Client-side persistent key-value store.
pub trait CredentialStore: Send + Sync {
    /// Current value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
}

/// Process-local store, shared by cloning.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a token already present.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(TOKEN_KEY, token);
        store
    }

    /// Write a value. Used by login flows and tests, never by the request path.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.inner.remove(key);
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }
}

/// JSON object on disk, re-read on every lookup.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CredentialError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let mut map: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| CredentialError::Format {
                path: self.path.clone(),
                source,
            })?;
        Ok(map.remove(key))
    }
}
