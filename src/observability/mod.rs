//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and router produce:
//!     → logging.rs (structured events keyed by request_id)
//!     → metrics.rs (counters, gauge, histogram)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → Prometheus scrape (when the exporter is installed)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log event for a call
//! - Library code only emits; the binary installs subscriber and exporter

pub mod logging;
pub mod metrics;
