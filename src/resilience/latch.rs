//! Degraded-mode latch.
//!
//! # States
//! - Live: no outage observed yet
//! - Degraded: at least one outage observed (terminal)
//!
//! # State Transitions
//! ```text
//! Live → Degraded: first classified outage, notice emitted
//! Degraded → Degraded: further outages, no notice
//! ```
//!
//! The latch only gates the user-facing notice. Fallback routing is the same
//! in both states.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::http::RequestId;
use crate::observability::metrics;
use crate::resilience::classifier::FailureClassification;

/// Text shown to the user when the client goes offline.
pub const DEGRADED_NOTICE: &str = "Backend issue. Switching to Offline Mode.";

/// Client mode as seen through the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    Live,
    Degraded,
}

/// What a notifier receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedNotice {
    pub message: &'static str,
    /// The outage that tripped the latch.
    pub classification: FailureClassification,
    pub request_id: RequestId,
}

/// Sink for the one-time degraded-mode notice.
pub trait DegradedModeNotifier: Send + Sync {
    fn notify(&self, notice: &DegradedNotice);
}

/// Default notifier: a warning in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl DegradedModeNotifier for LogNotifier {
    fn notify(&self, notice: &DegradedNotice) {
        tracing::warn!(
            request_id = %notice.request_id,
            classification = %notice.classification,
            "{}",
            notice.message
        );
    }
}

/// One-shot flag, set on the first outage and never reset.
#[derive(Debug, Default)]
pub struct DegradedModeLatch {
    tripped: AtomicBool,
}

impl DegradedModeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ClientMode {
        if self.tripped.load(Ordering::Acquire) {
            ClientMode::Degraded
        } else {
            ClientMode::Live
        }
    }

    /// Set the latch. Returns true only for the call that flipped it.
    pub fn trip(&self) -> bool {
        let first = !self.tripped.swap(true, Ordering::AcqRel);
        if first {
            metrics::record_degraded_mode(true);
        }
        first
    }
}
