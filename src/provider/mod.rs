//! Provider client abstraction.
//!
//! Concrete SDK clients (GROK, local models, ...) live outside this crate and
//! plug in by implementing [`ProviderClient`]. The router only ever talks to
//! providers through this trait.

pub mod error;

pub use error::{ProviderError, ProviderErrorKind};

use crate::routing::ChatRequest;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Successful provider reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub tokens_used: u32,
    /// Latency as measured by the client, in milliseconds
    pub latency_ms: u64,
}

impl ProviderResponse {
    pub fn new(content: impl Into<String>, tokens_used: u32, latency_ms: u64) -> Self {
        Self {
            content: content.into(),
            tokens_used,
            latency_ms,
        }
    }
}

/// Client for one configured provider.
///
/// # Object Safety
///
/// The router stores clients as `Arc<dyn ProviderClient>`, so the trait must
/// stay object-safe: no generic methods, no `Self` in return position.
///
/// # Cancellation
///
/// `call` futures may be dropped at any await point when the caller cancels
/// or the provider's timeout fires. Implementations must not rely on running
/// to completion.
#[async_trait]
pub trait ProviderClient: Send + Sync + 'static {
    /// Provider identifier this client serves; matches `ProviderDescriptor::id`.
    fn id(&self) -> &str;

    /// Send one chat request to the provider.
    async fn call(&self, request: &ChatRequest) -> Result<ProviderResponse, ProviderError>;
}

/// Attached provider clients, keyed by provider id.
///
/// Clients are looked up per attempt, so a client attached or detached while
/// a request is in flight takes effect for that request's later candidates.
#[derive(Default)]
pub struct ProviderClients {
    clients: DashMap<String, Arc<dyn ProviderClient>>,
}

impl ProviderClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a client under its own id, returning any client it replaced.
    pub fn attach(&self, client: Arc<dyn ProviderClient>) -> Option<Arc<dyn ProviderClient>> {
        self.clients.insert(client.id().to_string(), client)
    }

    pub fn detach(&self, provider_id: &str) -> Option<Arc<dyn ProviderClient>> {
        self.clients.remove(provider_id).map(|(_, client)| client)
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn ProviderClient>> {
        self.clients.get(provider_id).map(|c| Arc::clone(c.value()))
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.clients.contains_key(provider_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl ProviderClient for Echo {
        fn id(&self) -> &str {
            self.0
        }

        async fn call(&self, request: &ChatRequest) -> Result<ProviderResponse, ProviderError> {
            let content = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .ok_or_else(|| ProviderError::malformed("empty request"))?;
            Ok(ProviderResponse::new(content, 1, 0))
        }
    }

    #[tokio::test]
    async fn attach_and_call_through_trait_object() {
        let clients = ProviderClients::new();
        assert!(clients.attach(Arc::new(Echo("grok"))).is_none());
        assert!(clients.attach(Arc::new(Echo("grok"))).is_some());
        assert_eq!(clients.len(), 1);

        let client = clients.get("grok").unwrap();
        let response = client.call(&ChatRequest::new("ping")).await.unwrap();
        assert_eq!(response.content, "ping");

        assert!(clients.detach("grok").is_some());
        assert!(clients.get("grok").is_none());
        assert!(clients.is_empty());
    }
}
