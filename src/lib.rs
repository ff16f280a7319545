//! Resilient API client for the campus forum backend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Caller                     ┌──────────────────────────────────────────────┐
//!     ──────────────────────────▶│ client::ApiClient                            │
//!                                │   ┌──────────┐   ┌─────────┐   ┌──────────┐  │
//!                                │   │ pipeline │──▶│  auth   │──▶│   http   │──┼──▶ Backend
//!                                │   └──────────┘   └─────────┘   │transport │  │
//!                                │                                └────┬─────┘  │
//!                                │                      failure        ▼        │
//!                                │   ┌──────────────┐   ┌──────────────────┐    │
//!                                │   │  resilience  │◀──│ classify + latch │    │
//!                                │   └──────┬───────┘   └──────────────────┘    │
//!                                │          │ outage                            │
//!                                │          ▼                                   │
//!                                │   ┌──────────────┐   ┌──────────────────┐    │
//!     ◀──────────────────────────┼───│   routing    │──▶│   substitute     │    │
//!     NormalizedResponse         │   │  rule table  │   │ LocalDataSource  │    │
//!     or ApiError                │   └──────────────┘   └──────────────────┘    │
//!                                └──────────────────────────────────────────────┘
//! ```
//!
//! Live and substitute responses share one shape, so callers cannot tell
//! them apart except through [`ApiClient::mode`].

pub mod auth;
pub mod client;
pub mod config;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod substitute;

pub use client::{ApiClient, ApiClientBuilder, ApiError, ApiResult, ClientBuildError};
pub use config::ClientConfig;
pub use http::{FormData, Method, NormalizedResponse, RequestBody, RequestDescriptor};
pub use resilience::{ClientMode, DegradedModeNotifier, DegradedNotice, FailureClassification};
