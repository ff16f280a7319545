//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed request:
//!     → classifier.rs (NoResponse / ServerFault / ClientFault / Other)
//!     → outage? latch.rs (first outage emits the degraded-mode notice)
//!     → routing::FallbackRouter (substitute response or original error)
//! ```
//!
//! # Design Decisions
//! - No retries: the first outage goes straight to fallback
//! - Classification is pure; the latch is the only mutable state
//! - Latch belongs to a client instance, never to the process

pub mod classifier;
pub mod latch;

pub use classifier::{classify, FailureClassification};
pub use latch::{
    ClientMode, DegradedModeLatch, DegradedModeNotifier, DegradedNotice, LogNotifier,
    DEGRADED_NOTICE,
};
