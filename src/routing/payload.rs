//! Request body decoding for substitute operations.
//!
//! Substitute operations take plain JSON. Forms become an object of their text
//! fields (first value wins, file parts dropped), string payloads are parsed,
//! structured payloads pass through and an empty body is `null`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::http::{FormData, FormValue, RequestBody};

/// A body that cannot be handed to a substitute operation.
#[derive(Debug, Error)]
pub enum BodyDecodeError {
    #[error("string body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Optional rewrite applied to a decoded body before the substitute sees it.
pub type PayloadTransform = fn(Value) -> Value;

/// Decode a request body into a plain JSON value.
pub fn decode_body(body: &RequestBody) -> Result<Value, BodyDecodeError> {
    match body {
        RequestBody::Empty => Ok(Value::Null),
        RequestBody::Json(payload) => Ok(payload.clone()),
        RequestBody::Text(text) => Ok(serde_json::from_str(text)?),
        RequestBody::Form(form) => Ok(form_to_object(form)),
    }
}

fn form_to_object(form: &FormData) -> Value {
    let mut object = Map::new();
    for part in form.parts() {
        if let FormValue::Text(value) = &part.value {
            object
                .entry(part.name.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }
    }
    Value::Object(object)
}

/// Post payloads from forms carry `isAnonymous` as the string "true"/"false".
pub fn coerce_post_flags(mut payload: Value) -> Value {
    if let Some(flag) = payload.get_mut("isAnonymous") {
        if let Some(anonymous) = flag.as_str().map(|text| text == "true") {
            *flag = Value::Bool(anonymous);
        }
    }
    payload
}
