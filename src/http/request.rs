//! Outbound request description.
//!
//! # Responsibilities
//! - Carry target path, method, body and headers for one call
//! - Generate unique request ID (UUID v4) for correlation
//! - Normalize header names so each header appears once
//!
//! # Design Decisions
//! - Built with consuming `with_*` methods; no mutation after issuance
//! - Query parameters are folded into the path so path matching sees them
//! - Multi-part forms keep insertion order and duplicate names

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier assigned to every descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// HTTP verbs the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One value in a multi-part form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        filename: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Named part of a multi-part form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// Ordered multi-part form payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Append a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                filename: filename.into(),
                content_type,
                bytes,
            },
        });
        self
    }

    /// First text value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.value {
            FormValue::Text(value) if part.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Structured payload, sent as JSON.
    Json(Value),
    /// Already-encoded payload, sent verbatim.
    Text(String),
    /// Multi-part form payload.
    Form(FormData),
}

/// Everything needed to issue one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    id: RequestId,
    method: Method,
    path: String,
    body: RequestBody,
    headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            method,
            path: path.into(),
            body: RequestBody::Empty,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_json(self, payload: Value) -> Self {
        self.with_body(RequestBody::Json(payload))
    }

    pub fn with_text(self, payload: impl Into<String>) -> Self {
        self.with_body(RequestBody::Text(payload.into()))
    }

    pub fn with_form(self, form: FormData) -> Self {
        self.with_body(RequestBody::Form(form))
    }

    /// Set a header, replacing any previous value under the same (case-insensitive) name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Append URL-encoded query parameters to the path.
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key.as_ref(), value.as_ref());
        }
        let query = serializer.finish();
        if !query.is_empty() {
            let separator = if self.path.contains('?') { '&' } else { '?' };
            self.path.push(separator);
            self.path.push_str(&query);
        }
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
