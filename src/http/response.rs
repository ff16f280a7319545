//! Normalized response shape.
//!
//! Live responses and substitute responses are both reduced to a payload plus
//! a status code, so callers never learn where a response came from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response handed to every caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    pub payload: Value,
    pub status_code: u16,
}

impl NormalizedResponse {
    pub fn new(payload: Value, status_code: u16) -> Self {
        Self {
            payload,
            status_code,
        }
    }

    /// A 200 response, the status every substitute result carries.
    pub fn ok(payload: Value) -> Self {
        Self::new(payload, 200)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Deserialize the payload into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

/// Decode a response body: JSON when it parses, raw text otherwise, null when empty.
pub fn decode_payload(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
