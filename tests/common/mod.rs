//! Shared test utilities for model router integration tests.
//!
//! Provides scripted provider clients and router builders to reduce
//! duplication across test files.

#![allow(dead_code)]

use async_trait::async_trait;
use model_router::provider::{ProviderClient, ProviderError, ProviderResponse};
use model_router::registry::ProviderDescriptor;
use model_router::routing::{ChatRequest, RoutingPolicy};
use model_router::ModelRouter;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Mock Providers
// =============================================================================

/// How a [`MockProvider`] answers.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Fail,
    /// Answer after a delay (measured on the tokio clock)
    Delay(Duration),
}

/// Provider client with scripted behavior that counts its calls.
pub struct MockProvider {
    id: String,
    script: Script,
    calls: AtomicU32,
}

impl MockProvider {
    pub fn new(id: &str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            script,
            calls: AtomicU32::new(0),
        })
    }

    pub fn succeeding(id: &str) -> Arc<Self> {
        Self::new(id, Script::Succeed)
    }

    pub fn failing(id: &str) -> Arc<Self> {
        Self::new(id, Script::Fail)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn call(&self, _request: &ChatRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Succeed => Ok(ProviderResponse::new(format!("answer from {}", self.id), 12, 5)),
            Script::Fail => Err(ProviderError::rejected(format!("{} is down", self.id))),
            Script::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(ProviderResponse::new(
                    format!("late answer from {}", self.id),
                    12,
                    delay.as_millis() as u64,
                ))
            }
        }
    }
}

// =============================================================================
// Router Builders
// =============================================================================

/// Router with the given providers registered and clients attached.
pub fn router_with(
    policy: RoutingPolicy,
    providers: Vec<(ProviderDescriptor, Arc<MockProvider>)>,
) -> ModelRouter {
    let router = ModelRouter::new(policy);
    for (descriptor, client) in providers {
        router.register_provider(descriptor);
        router.attach_client(client);
    }
    router
}

/// Plain user request.
pub fn request() -> ChatRequest {
    ChatRequest::new("What is the capital of France?")
}
