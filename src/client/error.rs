//! Client error types.

use serde_json::Value;
use thiserror::Error;

use crate::http::{RequestDescriptor, TransportError};
use crate::resilience::{classify, FailureClassification};

/// A failed call: the transport failure plus the request that caused it.
#[derive(Debug, Clone, Error)]
#[error("{descriptor}: {failure}")]
pub struct RequestError {
    pub failure: TransportError,
    pub descriptor: RequestDescriptor,
}

impl RequestError {
    pub fn new(failure: TransportError, descriptor: RequestDescriptor) -> Self {
        Self {
            failure,
            descriptor,
        }
    }
}

/// Error surfaced to callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response: the backend was unreachable.
    #[error("transport error: {0}")]
    Transport(Box<RequestError>),

    /// The backend answered with a 5xx status.
    #[error("server error: {0}")]
    Server(Box<RequestError>),

    /// The backend answered with a 4xx status.
    #[error("client error: {0}")]
    Client(Box<RequestError>),

    /// The request itself is unusable (unbuildable, undecodable body).
    #[error("malformed request {descriptor}: {reason}")]
    MalformedRequest {
        reason: String,
        descriptor: Box<RequestDescriptor>,
        failure: Option<TransportError>,
    },
}

/// Result type for client calls.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Wrap a request error under an already computed classification.
    pub fn classified(error: RequestError, classification: FailureClassification) -> Self {
        match classification {
            FailureClassification::NoResponse => Self::Transport(Box::new(error)),
            FailureClassification::ServerFault => Self::Server(Box::new(error)),
            FailureClassification::ClientFault => Self::Client(Box::new(error)),
            FailureClassification::Other => Self::MalformedRequest {
                reason: error.failure.to_string(),
                descriptor: Box::new(error.descriptor),
                failure: Some(error.failure),
            },
        }
    }

    /// A body that could not be decoded for a substitute operation.
    pub fn malformed(descriptor: RequestDescriptor, reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
            descriptor: Box::new(descriptor),
            failure: None,
        }
    }

    pub fn classification(&self) -> FailureClassification {
        match self {
            Self::Transport(_) => FailureClassification::NoResponse,
            Self::Server(_) => FailureClassification::ServerFault,
            Self::Client(_) => FailureClassification::ClientFault,
            Self::MalformedRequest { .. } => FailureClassification::Other,
        }
    }

    /// The request that failed.
    pub fn descriptor(&self) -> &RequestDescriptor {
        match self {
            Self::Transport(e) | Self::Server(e) | Self::Client(e) => &e.descriptor,
            Self::MalformedRequest { descriptor, .. } => &**descriptor,
        }
    }

    /// The original transport failure, if the request reached the transport.
    pub fn failure(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) | Self::Server(e) | Self::Client(e) => Some(&e.failure),
            Self::MalformedRequest { failure, .. } => failure.as_ref(),
        }
    }

    /// HTTP status of the response, when there was one.
    pub fn status(&self) -> Option<u16> {
        self.failure().and_then(TransportError::status_code)
    }

    /// Decoded body of the error response, e.g. a validation message.
    pub fn payload(&self) -> Option<&Value> {
        self.failure()
            .and_then(|f| f.response.as_ref())
            .map(|r| &r.payload)
    }
}

impl From<RequestError> for ApiError {
    fn from(error: RequestError) -> Self {
        let classification = classify(&error.failure);
        Self::classified(error, classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ErrorCode;
    use serde_json::json;

    fn request_error(failure: TransportError) -> RequestError {
        RequestError::new(failure, RequestDescriptor::get("/api/posts"))
    }

    #[test]
    fn test_taxonomy_follows_classification() {
        let err = ApiError::from(request_error(TransportError::no_response(
            Some(ErrorCode::ConnectionRefused),
            "refused",
        )));
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), None);

        let err = ApiError::from(request_error(TransportError::status(502, Value::Null)));
        assert!(matches!(err, ApiError::Server(_)));
        assert_eq!(err.status(), Some(502));

        let err = ApiError::from(request_error(TransportError::status(
            422,
            json!({ "message": "Title is required" }),
        )));
        assert!(matches!(err, ApiError::Client(_)));
        assert_eq!(err.payload().unwrap()["message"], "Title is required");

        let err = ApiError::from(request_error(TransportError::build("bad header")));
        assert!(matches!(err, ApiError::MalformedRequest { .. }));
        assert_eq!(err.classification(), FailureClassification::Other);
        assert!(err.failure().is_some());
    }

    #[test]
    fn test_display_names_the_request() {
        let err = ApiError::from(request_error(TransportError::status(503, Value::Null)));
        assert_eq!(
            err.to_string(),
            "server error: GET /api/posts: request failed with status code 503"
        );
    }

    #[test]
    fn test_malformed_body_error() {
        let err = ApiError::malformed(RequestDescriptor::post("/api/auth/login"), "not JSON");
        assert_eq!(err.descriptor().path(), "/api/auth/login");
        assert!(err.failure().is_none());
        assert_eq!(err.to_string(), "malformed request POST /api/auth/login: not JSON");
    }
}
