//! Client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (RequestDescriptor)
//!     → api.rs (ApiClient::send)
//!     → pipeline.rs (attach bearer, request ID, transmit once)
//!     → success: NormalizedResponse
//!     → failure: classify
//!         → outage: routing::FallbackRouter
//!         → otherwise: ApiError
//! ```

pub mod api;
pub mod error;
pub mod pipeline;

pub use api::{ApiClient, ApiClientBuilder, ClientBuildError};
pub use error::{ApiError, ApiResult, RequestError};
pub use pipeline::RequestPipeline;
