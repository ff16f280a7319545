//! Wire transport.
//!
//! # Responsibilities
//! - Resolve a request path against the configured base target
//! - Translate a descriptor into an HTTP call and back
//! - Report failures with enough detail to classify them
//!
//! # Design Decisions
//! - Non-2xx responses are errors, carrying the decoded body
//! - Connection-level failures carry an explicit error code
//! - Failures before transmission are tagged `RequestBuild`
//! - No retries here; the transport attempts each call once

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::http::request::{FormData, FormValue, RequestBody, RequestDescriptor};
use crate::http::response::{decode_payload, NormalizedResponse};

/// Machine-readable cause attached to a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The remote actively refused the connection.
    ConnectionRefused,
    /// The remote could not be reached (DNS, routing, reset).
    NetworkUnreachable,
    /// The transport's own deadline expired.
    TimedOut,
    /// The request could not be built; nothing was sent.
    RequestBuild,
}

/// Status and decoded body of a response that was received.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub payload: Value,
}

/// A failed transport attempt.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Known cause, when one could be determined.
    pub code: Option<ErrorCode>,
    /// The response, when the remote answered.
    pub response: Option<ResponseSnapshot>,
    pub message: String,
}

impl TransportError {
    /// The call never produced a response.
    pub fn no_response(code: Option<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code,
            response: None,
            message: message.into(),
        }
    }

    /// The remote answered with a non-2xx status.
    pub fn status(status: u16, payload: Value) -> Self {
        Self {
            code: None,
            response: Some(ResponseSnapshot { status, payload }),
            message: format!("request failed with status code {status}"),
        }
    }

    /// The request could not be built.
    pub fn build(message: impl Into<String>) -> Self {
        Self::no_response(Some(ErrorCode::RequestBuild), message)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

/// Issues one call per descriptor.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Result<NormalizedResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport from the API section of the configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::build(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a request path against the base target.
    pub fn resolve(&self, path: &str) -> Result<String, TransportError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }
        if self.base_url.is_empty() {
            return Err(TransportError::build(format!(
                "relative path '{path}' needs a base URL"
            )));
        }
        if path.starts_with('/') {
            Ok(format!("{}{}", self.base_url, path))
        } else {
            Ok(format!("{}/{}", self.base_url, path))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<NormalizedResponse, TransportError> {
        let url = self.resolve(request.path())?;
        let mut builder = self.client.request(request.method().into(), url);

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(payload) => builder.json(payload),
            RequestBody::Text(text) => {
                if request.header("content-type").is_none() {
                    builder = builder.header("content-type", "application/json");
                }
                builder.body(text.clone())
            }
            RequestBody::Form(form) => builder.multipart(to_multipart(form)?),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;
        let payload = decode_payload(&text);

        if (200..300).contains(&status) {
            Ok(NormalizedResponse::new(payload, status))
        } else {
            Err(TransportError::status(status, payload))
        }
    }
}

fn to_multipart(form: &FormData) -> Result<multipart::Form, TransportError> {
    let mut out = multipart::Form::new();
    for part in form.parts() {
        out = match &part.value {
            FormValue::Text(value) => out.text(part.name.clone(), value.clone()),
            FormValue::File {
                filename,
                content_type,
                bytes,
            } => {
                let mut file = multipart::Part::bytes(bytes.clone()).file_name(filename.clone());
                if let Some(mime) = content_type {
                    file = file
                        .mime_str(mime)
                        .map_err(|e| TransportError::build(format!("invalid content type '{mime}': {e}")))?;
                }
                out.part(part.name.clone(), file)
            }
        };
    }
    Ok(out)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let message = err.to_string();
    if err.is_builder() {
        return TransportError::build(message);
    }
    if err.is_timeout() {
        return TransportError::no_response(Some(ErrorCode::TimedOut), message);
    }
    if err.is_connect() {
        let code = if refused(&err) {
            ErrorCode::ConnectionRefused
        } else {
            ErrorCode::NetworkUnreachable
        };
        return TransportError::no_response(Some(code), message);
    }
    TransportError::no_response(None, message)
}

fn refused(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = e.source();
    }
    false
}
