//! Fallback rule table.
//!
//! # Precedence
//! Rules are tested in declaration order and the first match wins. Patterns
//! may overlap ("/posts" also matches "/posts/events"), so a specific rule
//! must come before a general one. The table enforces this: a rule that an
//! earlier rule fully covers (path and methods) can never fire and is
//! rejected at construction.
//!
//! # Default table
//! ```text
//!  #  pattern              methods  action
//!  1  /auth/login          any      authenticate(body)
//!  2  /auth/register       any      register(body)
//!  3  /auth/verify-otp     any      verify_one_time_code(body)
//!  4  /trending/hashtags   any      fixed tag list
//!  5  /posts/events        any      list_event_posts()
//!  6  /users/suggestions   any      list_user_suggestions()
//!  7  /posts               GET      list_posts()
//!  8  /posts               POST     declined (or create_post(body) when writes are substituted)
//! ```

use serde_json::{json, Value};
use thiserror::Error;

use crate::http::{Method, RequestDescriptor};
use crate::routing::matcher::{Matcher, MethodFilter, PathPattern};
use crate::routing::payload::{coerce_post_flags, PayloadTransform};

/// Substitute operation a rule delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstituteOp {
    Authenticate,
    Register,
    VerifyOneTimeCode,
    ListPosts,
    ListEventPosts,
    ListUserSuggestions,
    CreatePost,
}

impl SubstituteOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Register => "register",
            Self::VerifyOneTimeCode => "verify_one_time_code",
            Self::ListPosts => "list_posts",
            Self::ListEventPosts => "list_event_posts",
            Self::ListUserSuggestions => "list_user_suggestions",
            Self::CreatePost => "create_post",
        }
    }

    /// Whether the operation consumes the request body.
    pub fn takes_body(self) -> bool {
        matches!(
            self,
            Self::Authenticate | Self::Register | Self::VerifyOneTimeCode | Self::CreatePost
        )
    }
}

/// What the router does with a matched request.
#[derive(Debug, Clone)]
pub enum FallbackAction {
    /// Call the substitute source.
    Substitute {
        op: SubstituteOp,
        transform: Option<PayloadTransform>,
    },
    /// Answer with a constant payload.
    Fixed(fn() -> Value),
    /// Matched on purpose but left unhandled: the original error surfaces.
    Decline,
}

/// One entry of the table.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    name: String,
    path: PathPattern,
    methods: MethodFilter,
    action: FallbackAction,
}

impl FallbackRule {
    pub fn new(
        name: impl Into<String>,
        path: PathPattern,
        methods: MethodFilter,
        action: FallbackAction,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            methods,
            action,
        }
    }

    /// Rule delegating to a substitute operation.
    pub fn substitute(
        name: impl Into<String>,
        path: PathPattern,
        methods: MethodFilter,
        op: SubstituteOp,
    ) -> Self {
        Self::new(name, path, methods, FallbackAction::Substitute { op, transform: None })
    }

    /// Attach a payload transform. No effect on non-substitute rules.
    pub fn with_transform(mut self, transform: PayloadTransform) -> Self {
        if let FallbackAction::Substitute { transform: slot, .. } = &mut self.action {
            *slot = Some(transform);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    pub fn methods(&self) -> &MethodFilter {
        &self.methods
    }

    pub fn action(&self) -> &FallbackAction {
        &self.action
    }

    /// True when this rule matches every request `later` matches.
    fn shadows(&self, later: &FallbackRule) -> bool {
        self.path.covers(&later.path) && self.methods.covers(&later.methods)
    }
}

impl Matcher for FallbackRule {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.path.matches(req) && self.methods.matches(req)
    }
}

/// Errors raised while building a rule table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleTableError {
    #[error("rule '{rule}' can never match: earlier rule '{shadowed_by}' covers it")]
    Shadowed { rule: String, shadowed_by: String },
}

/// Ordered, validated list of fallback rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<FallbackRule>,
}

impl RuleTable {
    /// Build a table, rejecting rules that an earlier rule shadows.
    pub fn new(rules: Vec<FallbackRule>) -> Result<Self, RuleTableError> {
        for (j, later) in rules.iter().enumerate() {
            if let Some(earlier) = rules[..j].iter().find(|earlier| earlier.shadows(later)) {
                return Err(RuleTableError::Shadowed {
                    rule: later.name.clone(),
                    shadowed_by: earlier.name.clone(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// The default table. Writes are declined unless `substitute_writes` is set.
    pub fn defaults(substitute_writes: bool) -> Self {
        Self {
            rules: default_rules(substitute_writes),
        }
    }

    /// First rule matching the request.
    pub fn find(&self, req: &RequestDescriptor) -> Option<&FallbackRule> {
        self.rules.iter().find(|rule| rule.matches(req))
    }

    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }
}

/// Fixed trending-hashtag list served while offline.
pub fn trending_hashtags() -> Value {
    json!([
        { "tag": "kiit", "count": 42 },
        { "tag": "engineering", "count": 35 },
        { "tag": "campus", "count": 28 },
        { "tag": "tech", "count": 20 },
        { "tag": "events", "count": 15 },
    ])
}

fn default_rules(substitute_writes: bool) -> Vec<FallbackRule> {
    let create_post = if substitute_writes {
        FallbackRule::substitute(
            "posts.create",
            PathPattern::contains("/posts"),
            MethodFilter::only(Method::Post),
            SubstituteOp::CreatePost,
        )
        .with_transform(coerce_post_flags)
    } else {
        FallbackRule::new(
            "posts.create",
            PathPattern::contains("/posts"),
            MethodFilter::only(Method::Post),
            FallbackAction::Decline,
        )
    };

    vec![
        FallbackRule::substitute(
            "auth.login",
            PathPattern::contains("/auth/login"),
            MethodFilter::Any,
            SubstituteOp::Authenticate,
        ),
        FallbackRule::substitute(
            "auth.register",
            PathPattern::contains("/auth/register"),
            MethodFilter::Any,
            SubstituteOp::Register,
        ),
        FallbackRule::substitute(
            "auth.verify_otp",
            PathPattern::contains("/auth/verify-otp"),
            MethodFilter::Any,
            SubstituteOp::VerifyOneTimeCode,
        ),
        FallbackRule::new(
            "posts.trending_hashtags",
            PathPattern::contains("/trending/hashtags"),
            MethodFilter::Any,
            FallbackAction::Fixed(trending_hashtags),
        ),
        FallbackRule::substitute(
            "posts.events",
            PathPattern::contains("/posts/events"),
            MethodFilter::Any,
            SubstituteOp::ListEventPosts,
        ),
        FallbackRule::substitute(
            "users.suggestions",
            PathPattern::contains("/users/suggestions"),
            MethodFilter::Any,
            SubstituteOp::ListUserSuggestions,
        ),
        FallbackRule::substitute(
            "posts.list",
            PathPattern::contains("/posts"),
            MethodFilter::only(Method::Get),
            SubstituteOp::ListPosts,
        ),
        create_post,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for<'a>(table: &'a RuleTable, req: RequestDescriptor) -> Option<&'a str> {
        table.find(&req).map(FallbackRule::name)
    }

    #[test]
    fn test_default_tables_are_valid() {
        assert!(RuleTable::new(default_rules(false)).is_ok());
        assert!(RuleTable::new(default_rules(true)).is_ok());
    }

    #[test]
    fn test_default_dispatch() {
        let table = RuleTable::defaults(false);
        assert_eq!(rule_for(&table, RequestDescriptor::post("/api/auth/login")), Some("auth.login"));
        assert_eq!(
            rule_for(&table, RequestDescriptor::post("/api/auth/verify-otp")),
            Some("auth.verify_otp")
        );
        assert_eq!(
            rule_for(&table, RequestDescriptor::get("/api/posts/trending/hashtags")),
            Some("posts.trending_hashtags")
        );
        assert_eq!(rule_for(&table, RequestDescriptor::get("/api/posts/events")), Some("posts.events"));
        assert_eq!(
            rule_for(&table, RequestDescriptor::get("/api/posts").with_query([("page", "1")])),
            Some("posts.list")
        );
        assert_eq!(rule_for(&table, RequestDescriptor::get("/api/posts/abc123")), Some("posts.list"));
        assert_eq!(rule_for(&table, RequestDescriptor::post("/api/posts")), Some("posts.create"));
        assert_eq!(rule_for(&table, RequestDescriptor::delete("/api/posts/abc123")), None);
        assert_eq!(rule_for(&table, RequestDescriptor::post("/api/users/connect/u-1")), None);
    }

    #[test]
    fn test_specific_rule_declared_first_wins() {
        let table = RuleTable::new(vec![
            FallbackRule::substitute(
                "specific",
                PathPattern::contains("/posts/events"),
                MethodFilter::Any,
                SubstituteOp::ListEventPosts,
            ),
            FallbackRule::substitute(
                "general",
                PathPattern::contains("/posts"),
                MethodFilter::Any,
                SubstituteOp::ListPosts,
            ),
        ])
        .unwrap();

        // Matches both patterns.
        assert_eq!(rule_for(&table, RequestDescriptor::get("/api/posts/events")), Some("specific"));
        assert_eq!(rule_for(&table, RequestDescriptor::get("/api/posts")), Some("general"));
    }

    #[test]
    fn test_shadowed_rule_is_rejected() {
        let err = RuleTable::new(vec![
            FallbackRule::substitute(
                "general",
                PathPattern::contains("/posts"),
                MethodFilter::Any,
                SubstituteOp::ListPosts,
            ),
            FallbackRule::substitute(
                "specific",
                PathPattern::contains("/posts/events"),
                MethodFilter::only(Method::Get),
                SubstituteOp::ListEventPosts,
            ),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            RuleTableError::Shadowed {
                rule: "specific".into(),
                shadowed_by: "general".into(),
            }
        );
    }

    #[test]
    fn test_disjoint_methods_do_not_shadow() {
        let table = RuleTable::new(vec![
            FallbackRule::substitute(
                "read",
                PathPattern::contains("/posts"),
                MethodFilter::only(Method::Get),
                SubstituteOp::ListPosts,
            ),
            FallbackRule::substitute(
                "events",
                PathPattern::contains("/posts/events"),
                MethodFilter::only(Method::Post),
                SubstituteOp::ListEventPosts,
            ),
        ]);
        assert!(table.is_ok());
    }

    #[test]
    fn test_write_rule_switches_with_configuration() {
        let declined = RuleTable::defaults(false);
        let rule = declined.find(&RequestDescriptor::post("/api/posts")).unwrap();
        assert!(matches!(rule.action(), FallbackAction::Decline));

        let substituted = RuleTable::defaults(true);
        let rule = substituted.find(&RequestDescriptor::post("/api/posts")).unwrap();
        assert!(matches!(
            rule.action(),
            FallbackAction::Substitute {
                op: SubstituteOp::CreatePost,
                transform: Some(_)
            }
        ));
    }

    #[test]
    fn test_trending_hashtags_literal() {
        let tags = trending_hashtags();
        let pairs: Vec<(&str, u64)> = tags
            .as_array()
            .unwrap()
            .iter()
            .map(|t| (t["tag"].as_str().unwrap(), t["count"].as_u64().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![("kiit", 42), ("engineering", 35), ("campus", 28), ("tech", 20), ("events", 15)]
        );
    }
}
