//! API client facade.
//!
//! # Responsibilities
//! - Send every request through the pipeline once
//! - Classify failures and hand outages to the fallback router
//! - Return live or substitute responses in the same shape
//!
//! # Design Decisions
//! - Client faults and malformed requests bypass the router
//! - Without a router every failure surfaces as-is
//! - Cheap to clone; clones share the router and therefore the latch

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::auth::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::client::error::{ApiError, ApiResult};
use crate::client::pipeline::RequestPipeline;
use crate::config::{ClientConfig, CredentialBackend};
use crate::http::{
    FormData, NormalizedResponse, RequestDescriptor, ReqwestTransport, Transport, TransportError,
};
use crate::resilience::{classify, ClientMode, DegradedModeNotifier};
use crate::routing::{FallbackRouter, RuleTable};
use crate::substitute::{LocalDataSource, SubstituteSource};

/// Errors raised while assembling a client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),

    #[error("credentials.backend = \"file\" requires credentials.path")]
    MissingCredentialPath,
}

/// Resilient client for the forum backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    pipeline: Arc<RequestPipeline>,
    fallback: Option<Arc<FallbackRouter>>,
}

impl ApiClient {
    /// Client without fallback; every failure surfaces.
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, router: FallbackRouter) -> Self {
        self.fallback = Some(Arc::new(router));
        self
    }

    /// Builder seeded from a configuration.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// Build with the configured transport, credential store and fallback.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientBuildError> {
        Self::builder(config.clone()).build()
    }

    /// `Degraded` once any outage tripped the latch.
    pub fn mode(&self) -> ClientMode {
        self.fallback
            .as_ref()
            .map_or(ClientMode::Live, |router| router.mode())
    }

    /// Issue one call.
    pub async fn send(&self, descriptor: RequestDescriptor) -> ApiResult<NormalizedResponse> {
        let error = match self.pipeline.send(descriptor).await {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        let classification = classify(&error.failure);
        match &self.fallback {
            Some(router) if classification.is_outage() => {
                router.resolve(error, classification).await
            }
            _ => Err(ApiError::classified(error, classification)),
        }
    }

    pub async fn get(&self, path: &str) -> ApiResult<NormalizedResponse> {
        self.send(RequestDescriptor::get(path)).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> ApiResult<NormalizedResponse> {
        self.send(RequestDescriptor::post(path).with_json(body)).await
    }

    pub async fn post_form(&self, path: &str, form: FormData) -> ApiResult<NormalizedResponse> {
        self.send(RequestDescriptor::post(path).with_form(form)).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> ApiResult<NormalizedResponse> {
        self.send(RequestDescriptor::put(path).with_json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<NormalizedResponse> {
        self.send(RequestDescriptor::delete(path)).await
    }
}

/// Assembles an [`ApiClient`]; any part left unset comes from the config.
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn CredentialStore>>,
    source: Option<Arc<dyn SubstituteSource>>,
    notifier: Option<Arc<dyn DegradedModeNotifier>>,
    rules: Option<RuleTable>,
}

impl ApiClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            credentials: None,
            source: None,
            notifier: None,
            rules: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn substitute_source(mut self, source: Arc<dyn SubstituteSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn DegradedModeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the default rule table.
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientBuildError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config.api)?),
        };

        let credentials: Arc<dyn CredentialStore> = match self.credentials {
            Some(credentials) => credentials,
            None => match self.config.credentials.backend {
                CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
                CredentialBackend::File => {
                    let path = self
                        .config
                        .credentials
                        .path
                        .as_deref()
                        .ok_or(ClientBuildError::MissingCredentialPath)?;
                    Arc::new(FileCredentialStore::new(path))
                }
            },
        };

        let client = ApiClient::new(RequestPipeline::new(transport, credentials));
        let fallback = &self.config.fallback;
        if !fallback.enabled {
            tracing::debug!("Fallback disabled, all failures will surface");
            return Ok(client);
        }

        let source = self.source.unwrap_or_else(|| {
            Arc::new(
                LocalDataSource::new()
                    .with_simulated_latency(Duration::from_millis(fallback.simulated_latency_ms)),
            )
        });
        let rules = self
            .rules
            .unwrap_or_else(|| RuleTable::defaults(fallback.substitute_writes));

        let mut router = FallbackRouter::new(rules, source);
        if let Some(notifier) = self.notifier {
            router = router.with_notifier(notifier);
        }

        tracing::debug!(
            rules = router.table().rules().len(),
            substitute_writes = fallback.substitute_writes,
            "Fallback router ready"
        );
        Ok(client.with_fallback(router))
    }
}
