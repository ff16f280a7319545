//! Fallback routing subsystem.
//!
//! # Data Flow
//! ```text
//! Outage (RequestError + classification)
//!     → router.rs (trip latch, look up rule)
//!     → rules.rs (ordered table, first match wins)
//!     → matcher.rs (path pattern + method filter)
//!     → payload.rs (decode body for the substitute)
//!     → Return: substitute NormalizedResponse or the original error
//! ```
//!
//! # Design Decisions
//! - Table built once, immutable at runtime
//! - No regex (substring/prefix matching only)
//! - Deterministic: same request always matches same rule
//! - First match wins; shadowed rules are rejected up front

pub mod matcher;
pub mod payload;
pub mod router;
pub mod rules;

pub use matcher::{Matcher, MethodFilter, PathPattern};
pub use payload::{decode_body, BodyDecodeError, PayloadTransform};
pub use router::FallbackRouter;
pub use rules::{
    trending_hashtags, FallbackAction, FallbackRule, RuleTable, RuleTableError, SubstituteOp,
};
