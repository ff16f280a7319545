//! Failure classification.
//!
//! # Rules (checked in order)
//! ```text
//! code = ConnectionRefused | NetworkUnreachable  → NoResponse
//! code = RequestBuild                            → Other
//! no response                                    → NoResponse
//! status >= 500                                  → ServerFault
//! status in 400..=499                            → ClientFault
//! anything else                                  → Other
//! ```
//!
//! # Design Decisions
//! - Pure function of the error; the single gate for fallback eligibility
//! - Timeouts have no response and therefore count as NoResponse
//! - Build failures never reached the network, so they are not outages

use std::fmt;

use crate::http::transport::{ErrorCode, TransportError};

/// Verdict over a failed transport attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClassification {
    /// No connection or no response.
    NoResponse,
    /// The remote answered with a 5xx status.
    ServerFault,
    /// The remote answered with a 4xx status.
    ClientFault,
    /// Anything else, e.g. a request that could not be built.
    Other,
}

impl FailureClassification {
    /// Whether this failure is offered to the fallback router.
    pub fn is_outage(self) -> bool {
        matches!(self, Self::NoResponse | Self::ServerFault)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoResponse => "no_response",
            Self::ServerFault => "server_fault",
            Self::ClientFault => "client_fault",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a transport error.
pub fn classify(error: &TransportError) -> FailureClassification {
    match error.code {
        Some(ErrorCode::ConnectionRefused | ErrorCode::NetworkUnreachable) => {
            return FailureClassification::NoResponse
        }
        Some(ErrorCode::RequestBuild) => return FailureClassification::Other,
        Some(ErrorCode::TimedOut) | None => {}
    }

    match error.response.as_ref().map(|r| r.status) {
        None => FailureClassification::NoResponse,
        Some(status) if status >= 500 => FailureClassification::ServerFault,
        Some(400..=499) => FailureClassification::ClientFault,
        Some(_) => FailureClassification::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::ResponseSnapshot;
    use serde_json::Value;

    fn with_response(status: u16) -> TransportError {
        TransportError::status(status, Value::Null)
    }

    #[test]
    fn test_no_response_variants() {
        let plain = TransportError::no_response(None, "socket hang up");
        let refused = TransportError::no_response(Some(ErrorCode::ConnectionRefused), "refused");
        let unreachable = TransportError::no_response(Some(ErrorCode::NetworkUnreachable), "dns");
        let timeout = TransportError::no_response(Some(ErrorCode::TimedOut), "timeout");

        for err in [plain, refused, unreachable, timeout] {
            assert_eq!(classify(&err), FailureClassification::NoResponse);
        }
    }

    #[test]
    fn test_network_code_wins_over_response() {
        let err = TransportError {
            code: Some(ErrorCode::ConnectionRefused),
            response: Some(ResponseSnapshot {
                status: 404,
                payload: Value::Null,
            }),
            message: "refused".into(),
        };
        assert_eq!(classify(&err), FailureClassification::NoResponse);
    }

    #[test]
    fn test_status_ranges() {
        assert_eq!(classify(&with_response(500)), FailureClassification::ServerFault);
        assert_eq!(classify(&with_response(503)), FailureClassification::ServerFault);
        assert_eq!(classify(&with_response(599)), FailureClassification::ServerFault);
        assert_eq!(classify(&with_response(400)), FailureClassification::ClientFault);
        assert_eq!(classify(&with_response(404)), FailureClassification::ClientFault);
        assert_eq!(classify(&with_response(499)), FailureClassification::ClientFault);
        assert_eq!(classify(&with_response(304)), FailureClassification::Other);
    }

    #[test]
    fn test_build_failure_is_other() {
        let err = TransportError::build("relative path needs a base URL");
        assert_eq!(classify(&err), FailureClassification::Other);
        assert!(!classify(&err).is_outage());
    }

    #[test]
    fn test_deterministic() {
        let errors = [
            TransportError::no_response(None, "x"),
            with_response(502),
            with_response(401),
            TransportError::build("x"),
        ];
        for err in &errors {
            let first = classify(err);
            for _ in 0..10 {
                assert_eq!(classify(err), first);
            }
        }
    }

    #[test]
    fn test_only_outages_are_eligible() {
        assert!(FailureClassification::NoResponse.is_outage());
        assert!(FailureClassification::ServerFault.is_outage());
        assert!(!FailureClassification::ClientFault.is_outage());
        assert!(!FailureClassification::Other.is_outage());
    }
}
