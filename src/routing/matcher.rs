//! Request matching logic.
//!
//! # Responsibilities
//! - Match the target path (substring or prefix, case-sensitive)
//! - Match the method (any, or a fixed set)
//! - Decide whether one matcher covers everything another one matches
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - The query string is part of the path and is matched too

use crate::http::{Method, RequestDescriptor};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &RequestDescriptor) -> bool;
}

/// How a path pattern is compared with the target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Pattern occurs anywhere in the path.
    Contains(String),
    /// Path starts with the pattern.
    Prefix(String),
}

impl PathPattern {
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self::Contains(pattern.into())
    }

    pub fn prefix(pattern: impl Into<String>) -> Self {
        Self::Prefix(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Contains(p) | Self::Prefix(p) => p,
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Self::Contains(p) => path.contains(p.as_str()),
            Self::Prefix(p) => path.starts_with(p.as_str()),
        }
    }

    /// True when every path matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &PathPattern) -> bool {
        match (self, other) {
            (Self::Contains(a), b) => b.as_str().contains(a.as_str()),
            (Self::Prefix(a), Self::Prefix(b)) => b.starts_with(a.as_str()),
            (Self::Prefix(_), Self::Contains(_)) => false,
        }
    }
}

impl Matcher for PathPattern {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.is_match(req.path())
    }
}

/// Which methods a rule accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Vec<Method>),
}

impl MethodFilter {
    pub fn only(method: Method) -> Self {
        Self::Only(vec![method])
    }

    pub fn accepts(&self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(&method),
        }
    }

    /// True when every method accepted by `other` is accepted by `self`.
    pub fn covers(&self, other: &MethodFilter) -> bool {
        match (self, other) {
            (Self::Any, _) => true,
            (Self::Only(_), Self::Any) => false,
            (Self::Only(_), Self::Only(theirs)) => theirs.iter().all(|m| self.accepts(*m)),
        }
    }
}

impl Matcher for MethodFilter {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.accepts(req.method())
    }
}
