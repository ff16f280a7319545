//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (request.rs: path, method, body, headers, request ID)
//!     → transport.rs (resolve against base URL, send via reqwest)
//!     → response.rs (decode body into NormalizedResponse)
//!     → or TransportError (code + optional response snapshot)
//! ```

pub mod request;
pub mod response;
pub mod transport;

pub use request::{
    FormData, FormPart, FormValue, Method, RequestBody, RequestDescriptor, RequestId, UnknownMethod,
    X_REQUEST_ID,
};
pub use response::NormalizedResponse;
pub use transport::{ErrorCode, ReqwestTransport, ResponseSnapshot, Transport, TransportError};
