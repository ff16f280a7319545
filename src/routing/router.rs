//! Fallback router.
//!
//! # Responsibilities
//! - Emit the degraded-mode notice on the first outage
//! - Find the first rule matching the failed request
//! - Run the rule's substitute operation and wrap its result as a 200
//! - Surface the original error when nothing handles the request
//!
//! # Design Decisions
//! - Only called for outages; 4xx and malformed requests never get here
//! - Substitute failures are logged and replaced by the original error
//! - An undecodable body fails the attempt as a malformed request
//! - Routing is identical before and after the latch trips

use std::sync::Arc;

use serde_json::{json, Value};

use crate::client::error::{ApiError, RequestError};
use crate::http::NormalizedResponse;
use crate::observability::metrics;
use crate::resilience::{
    ClientMode, DegradedModeLatch, DegradedModeNotifier, DegradedNotice, FailureClassification,
    LogNotifier, DEGRADED_NOTICE,
};
use crate::routing::payload::decode_body;
use crate::routing::rules::{FallbackAction, RuleTable, SubstituteOp};
use crate::substitute::{SubstituteResult, SubstituteSource};

/// Reroutes outage-failed requests to the substitute data source.
pub struct FallbackRouter {
    table: RuleTable,
    source: Arc<dyn SubstituteSource>,
    latch: DegradedModeLatch,
    notifier: Arc<dyn DegradedModeNotifier>,
}

impl FallbackRouter {
    /// Create a router that reports the degraded-mode notice to the log.
    pub fn new(table: RuleTable, source: Arc<dyn SubstituteSource>) -> Self {
        Self {
            table,
            source,
            latch: DegradedModeLatch::new(),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the notice sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn DegradedModeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn mode(&self) -> ClientMode {
        self.latch.mode()
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Resolve an outage into a substitute response, or give the error back.
    pub async fn resolve(
        &self,
        error: RequestError,
        classification: FailureClassification,
    ) -> Result<NormalizedResponse, ApiError> {
        let request_id = error.descriptor.id();
        metrics::record_outage(classification.as_str());
        self.note_outage(classification, &error);

        let Some(rule) = self.table.find(&error.descriptor) else {
            tracing::debug!(
                request_id = %request_id,
                path = %error.descriptor.path(),
                "No fallback rule matched"
            );
            metrics::record_fallback("none", "unmatched");
            return Err(ApiError::classified(error, classification));
        };

        match rule.action() {
            FallbackAction::Decline => {
                tracing::debug!(
                    request_id = %request_id,
                    rule = %rule.name(),
                    "Fallback rule declines this request"
                );
                metrics::record_fallback(rule.name(), "declined");
                Err(ApiError::classified(error, classification))
            }
            FallbackAction::Fixed(payload) => {
                metrics::record_fallback(rule.name(), "served");
                Ok(NormalizedResponse::ok(payload()))
            }
            FallbackAction::Substitute { op, transform } => {
                let body = if op.takes_body() {
                    match decode_body(error.descriptor.body()) {
                        Ok(body) => body,
                        Err(e) => {
                            tracing::warn!(
                                request_id = %request_id,
                                rule = %rule.name(),
                                error = %e,
                                "Request body cannot be decoded for fallback"
                            );
                            metrics::record_fallback(rule.name(), "malformed");
                            return Err(ApiError::malformed(error.descriptor, e.to_string()));
                        }
                    }
                } else {
                    Value::Null
                };
                let body = match transform {
                    Some(transform) => transform(body),
                    None => body,
                };

                match self.invoke(*op, body).await {
                    Ok(payload) => {
                        tracing::info!(
                            request_id = %request_id,
                            rule = %rule.name(),
                            operation = op.as_str(),
                            "Served from local data source"
                        );
                        metrics::record_fallback(rule.name(), "served");
                        Ok(NormalizedResponse::ok(payload))
                    }
                    Err(e) => {
                        tracing::warn!(
                            request_id = %request_id,
                            rule = %rule.name(),
                            operation = op.as_str(),
                            error = %e,
                            "Local data source failed, surfacing original error"
                        );
                        metrics::record_fallback(rule.name(), "substitute_failed");
                        Err(ApiError::classified(error, classification))
                    }
                }
            }
        }
    }

    fn note_outage(&self, classification: FailureClassification, error: &RequestError) {
        if self.latch.trip() {
            self.notifier.notify(&DegradedNotice {
                message: DEGRADED_NOTICE,
                classification,
                request_id: error.descriptor.id(),
            });
        }
    }

    async fn invoke(&self, op: SubstituteOp, body: Value) -> SubstituteResult<Value> {
        match op {
            SubstituteOp::Authenticate => self.source.authenticate(body).await,
            SubstituteOp::Register => self.source.register(body).await,
            SubstituteOp::VerifyOneTimeCode => self.source.verify_one_time_code(body).await,
            SubstituteOp::ListPosts => self.source.list_posts().await,
            SubstituteOp::ListEventPosts => self.source.list_event_posts().await,
            SubstituteOp::ListUserSuggestions => self.source.list_user_suggestions().await,
            SubstituteOp::CreatePost => {
                let post = self.source.create_post(body).await?;
                Ok(json!({
                    "post": post,
                    "message": "Post created (Offline Mode)",
                    "moderationStatus": "approved",
                }))
            }
        }
    }
}

impl std::fmt::Debug for FallbackRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackRouter")
            .field("rules", &self.table.rules().len())
            .field("mode", &self.latch.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{ErrorCode, FormData, RequestDescriptor, TransportError};
    use crate::substitute::{LocalDataSource, SubstituteError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingNotifier {
        count: AtomicUsize,
    }

    impl DegradedModeNotifier for CountingNotifier {
        fn notify(&self, notice: &DegradedNotice) {
            assert_eq!(notice.message, DEGRADED_NOTICE);
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Substitute whose every operation fails.
    struct Broken;

    #[async_trait]
    impl SubstituteSource for Broken {
        async fn authenticate(&self, _: Value) -> SubstituteResult<Value> {
            Err(SubstituteError::Rejected("no".into()))
        }
        async fn register(&self, _: Value) -> SubstituteResult<Value> {
            Err(SubstituteError::Rejected("no".into()))
        }
        async fn verify_one_time_code(&self, _: Value) -> SubstituteResult<Value> {
            Err(SubstituteError::Rejected("no".into()))
        }
        async fn list_posts(&self) -> SubstituteResult<Value> {
            Err(SubstituteError::Rejected("no".into()))
        }
        async fn list_event_posts(&self) -> SubstituteResult<Value> {
            Err(SubstituteError::Rejected("no".into()))
        }
        async fn list_user_suggestions(&self) -> SubstituteResult<Value> {
            Err(SubstituteError::Rejected("no".into()))
        }
    }

    fn router(substitute_writes: bool) -> FallbackRouter {
        FallbackRouter::new(
            RuleTable::defaults(substitute_writes),
            Arc::new(LocalDataSource::new()),
        )
    }

    fn offline(descriptor: RequestDescriptor) -> RequestError {
        RequestError::new(
            TransportError::no_response(Some(ErrorCode::ConnectionRefused), "connect ECONNREFUSED"),
            descriptor,
        )
    }

    #[tokio::test]
    async fn test_events_served_empty() {
        let resp = router(false)
            .resolve(offline(RequestDescriptor::get("/api/posts/events")), FailureClassification::NoResponse)
            .await
            .unwrap();
        assert_eq!(resp, NormalizedResponse::ok(json!([])));
    }

    #[tokio::test]
    async fn test_login_uses_string_body() {
        let req = RequestDescriptor::post("/api/auth/login")
            .with_text(r#"{"email":"aarav@kiit.ac.in","password":"secret"}"#);
        let resp = router(false)
            .resolve(offline(req), FailureClassification::NoResponse)
            .await
            .unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.payload["user"]["name"], "Aarav Mishra");
    }

    #[tokio::test]
    async fn test_malformed_body_fails_attempt() {
        let req = RequestDescriptor::post("/api/auth/login").with_text("{not json");
        let err = router(false)
            .resolve(offline(req), FailureClassification::NoResponse)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedRequest { failure: None, .. }));
    }

    #[tokio::test]
    async fn test_unmatched_reraises_original() {
        let err = router(false)
            .resolve(
                offline(RequestDescriptor::post("/api/users/connect/u-1002")),
                FailureClassification::NoResponse,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.failure().unwrap().message, "connect ECONNREFUSED");
    }

    #[tokio::test]
    async fn test_substitute_failure_reraises_original() {
        let router = FallbackRouter::new(RuleTable::defaults(false), Arc::new(Broken));
        let failure = TransportError::status(503, json!("Service Unavailable"));
        let err = router
            .resolve(
                RequestError::new(failure, RequestDescriptor::get("/api/posts")),
                FailureClassification::ServerFault,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_substituted_write_decodes_form() {
        let form = FormData::new()
            .text("title", "Lost ID card")
            .text("content", "Near the library")
            .text("isAnonymous", "true");
        let req = RequestDescriptor::post("/api/posts").with_form(form);
        let resp = router(true)
            .resolve(offline(req), FailureClassification::NoResponse)
            .await
            .unwrap();

        assert_eq!(resp.payload["message"], "Post created (Offline Mode)");
        assert_eq!(resp.payload["moderationStatus"], "approved");
        assert_eq!(resp.payload["post"]["isAnonymous"], true);
    }

    #[tokio::test]
    async fn test_notice_fires_once_even_when_unmatched() {
        let notifier = Arc::new(CountingNotifier::default());
        let router = router(false).with_notifier(notifier.clone());
        assert_eq!(router.mode(), ClientMode::Live);

        for path in ["/api/users/connect/1", "/api/posts/events", "/api/posts"] {
            let _ = router
                .resolve(offline(RequestDescriptor::get(path)), FailureClassification::NoResponse)
                .await;
        }

        assert_eq!(notifier.count.load(Ordering::SeqCst), 1);
        assert_eq!(router.mode(), ClientMode::Degraded);
    }
}
