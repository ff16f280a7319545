//! Substitute data source.
//!
//! # Data Flow
//! ```text
//! FallbackRouter (matched rule, decoded body)
//!     → SubstituteSource operation
//!     → JSON payload (wrapped by the router as a 200 response)
//!     → or SubstituteError (router surfaces the original outage instead)
//! ```
//!
//! # Design Decisions
//! - Operations take and return plain JSON, mirroring the live wire shape
//! - Errors are final; there is no second-level fallback
//! - `create_post` is optional and only reached when substituted writes are on

pub mod local;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use local::LocalDataSource;

/// Errors raised by a substitute operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstituteError {
    /// The payload was well-formed but refused (bad credentials, wrong code).
    #[error("rejected: {0}")]
    Rejected(String),

    /// A required field is missing or has the wrong type.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The source does not implement this operation.
    #[error("operation '{0}' is not available offline")]
    Unsupported(&'static str),
}

/// Result type for substitute operations.
pub type SubstituteResult<T> = Result<T, SubstituteError>;

/// Local stand-in for the live backend.
#[async_trait]
pub trait SubstituteSource: Send + Sync {
    /// Log in with `{ email, password }`.
    async fn authenticate(&self, credentials: Value) -> SubstituteResult<Value>;

    /// Start registration for a new user.
    async fn register(&self, new_user: Value) -> SubstituteResult<Value>;

    /// Complete registration with `{ email, otp }`.
    async fn verify_one_time_code(&self, payload: Value) -> SubstituteResult<Value>;

    /// Feed listing, shaped like the live `/posts` response.
    async fn list_posts(&self) -> SubstituteResult<Value>;

    /// Event posts for the calendar.
    async fn list_event_posts(&self) -> SubstituteResult<Value>;

    /// People-you-may-know suggestions.
    async fn list_user_suggestions(&self) -> SubstituteResult<Value>;

    /// Create a post. Only used when substituted writes are enabled.
    async fn create_post(&self, _post: Value) -> SubstituteResult<Value> {
        Err(SubstituteError::Unsupported("createPost"))
    }
}

/// Required string field of a JSON object.
pub(crate) fn required_str<'a>(payload: &'a Value, field: &str) -> SubstituteResult<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SubstituteError::InvalidPayload(format!("'{field}' is required")))
}
