//! Request pipeline.
//!
//! # Responsibilities
//! - Attach the current credential right before transmission
//! - Tag the request with its ID for correlation
//! - Hand the request to the transport exactly once
//!
//! # Design Decisions
//! - No retry, no cache, no rate limit
//! - Failures carry the descriptor that was actually sent

use std::sync::Arc;
use std::time::Instant;

use crate::auth::{authorize, CredentialStore};
use crate::client::error::RequestError;
use crate::http::{NormalizedResponse, RequestDescriptor, Transport, X_REQUEST_ID};
use crate::observability::metrics;

/// Issues one outbound call per invocation.
#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
}

impl RequestPipeline {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Authorize and send a request.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<NormalizedResponse, RequestError> {
        let request_id = descriptor.id();
        let descriptor = authorize(descriptor, self.credentials.as_ref())
            .with_header(X_REQUEST_ID, request_id.to_string());
        let method = descriptor.method();

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %descriptor.path(),
            "Sending request"
        );

        let start = Instant::now();
        match self.transport.execute(&descriptor).await {
            Ok(response) => {
                metrics::record_request(method.as_str(), response.status_code, start);
                tracing::debug!(
                    request_id = %request_id,
                    status = response.status_code,
                    "Request succeeded"
                );
                Ok(response)
            }
            Err(failure) => {
                metrics::record_request(method.as_str(), failure.status_code().unwrap_or(0), start);
                tracing::debug!(
                    request_id = %request_id,
                    status = ?failure.status_code(),
                    error = %failure,
                    "Request failed"
                );
                Err(RequestError::new(failure, descriptor))
            }
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryCredentialStore, AUTHORIZATION, TOKEN_KEY};
    use crate::http::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every descriptor and answers from a fixed script.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<RequestDescriptor>>,
        fail_with: Option<TransportError>,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn execute(&self, request: &RequestDescriptor) -> Result<NormalizedResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(NormalizedResponse::ok(json!({ "ok": true }))),
            }
        }
    }

    #[tokio::test]
    async fn test_attaches_bearer_and_request_id() {
        let transport = Arc::new(Recording::default());
        let store = MemoryCredentialStore::with_token("t0k3n");
        let pipeline = RequestPipeline::new(transport.clone(), Arc::new(store));

        let req = RequestDescriptor::get("/api/posts");
        let id = req.id();
        pipeline.send(req).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].header(AUTHORIZATION), Some("Bearer t0k3n"));
        assert_eq!(seen[0].header(X_REQUEST_ID), Some(id.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_reads_credential_on_every_request() {
        let transport = Arc::new(Recording::default());
        let store = MemoryCredentialStore::new();
        let pipeline = RequestPipeline::new(transport.clone(), Arc::new(store.clone()));

        pipeline.send(RequestDescriptor::get("/api/posts")).await.unwrap();
        store.set(TOKEN_KEY, "after-login");
        pipeline.send(RequestDescriptor::get("/api/posts")).await.unwrap();
        store.remove(TOKEN_KEY);
        pipeline.send(RequestDescriptor::get("/api/posts")).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].header(AUTHORIZATION), None);
        assert_eq!(seen[1].header(AUTHORIZATION), Some("Bearer after-login"));
        assert_eq!(seen[2].header(AUTHORIZATION), None);
    }

    #[tokio::test]
    async fn test_failure_carries_sent_descriptor() {
        let transport = Arc::new(Recording {
            fail_with: Some(TransportError::status(500, json!("boom"))),
            ..Default::default()
        });
        let pipeline = RequestPipeline::new(transport, Arc::new(MemoryCredentialStore::with_token("x")));

        let err = pipeline
            .send(RequestDescriptor::post("/api/posts").with_json(json!({ "title": "t" })))
            .await
            .unwrap_err();
        assert_eq!(err.failure.status_code(), Some(500));
        assert_eq!(err.descriptor.path(), "/api/posts");
        assert_eq!(err.descriptor.header(AUTHORIZATION), Some("Bearer x"));
    }
}
