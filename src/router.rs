//! The router facade.
//!
//! [`ModelRouter`] is an explicit instance wiring the registry, health
//! tracker, attached clients and default policy together. There is no global
//! router; create one per process (or per test) and share it behind an `Arc`.

use crate::config::{load_from_config, ConfigError, LoadedConfig, RouterConfig};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::RouterError;
use crate::health::{HealthConfig, HealthTracker, ProviderHealth};
use crate::metrics;
use crate::provider::{ProviderClient, ProviderClients};
use crate::registry::{Capability, ProviderDescriptor, Registry, RegistryError, RegistrySnapshot};
use crate::routing::{
    select_candidates, ChatRequest, RoutingDecision, RoutingError, RoutingPolicy, RoutingStrategy,
};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a reload changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
    pub unchanged: usize,
    /// Registry generation published by the reload
    pub generation: u64,
}

impl ReloadSummary {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Operational status of one provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub id: String,
    pub enabled: bool,
    pub priority: i32,
    pub cost_per_unit: f64,
    pub max_requests_per_minute: u32,
    pub capabilities: BTreeSet<Capability>,
    pub client_attached: bool,
    pub health: ProviderHealth,
}

/// Status of every registered provider, in registry order.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub generation: u64,
    pub default_strategy: RoutingStrategy,
    pub providers: Vec<ProviderStatus>,
}

/// Everything a routing decision reads, published as one unit.
///
/// Writers build a complete replacement and store it with a single pointer
/// swap, so a decision never pairs one generation's providers with another
/// generation's policy or thresholds.
#[derive(Debug)]
struct ActiveConfig {
    snapshot: Arc<RegistrySnapshot>,
    default_policy: Arc<RoutingPolicy>,
    health: Arc<HealthConfig>,
}

/// Routes chat requests across registered providers.
pub struct ModelRouter {
    registry: Registry,
    active: ArcSwap<ActiveConfig>,
    health: Arc<HealthTracker>,
    clients: Arc<ProviderClients>,
    dispatcher: Dispatcher,
    /// Held by every writer: provider changes, policy changes and reloads
    write_lock: Mutex<()>,
}

impl ModelRouter {
    /// Empty router using `default_policy` for requests without an override.
    pub fn new(default_policy: RoutingPolicy) -> Self {
        Self::from_parts(Registry::new(), HealthTracker::default(), default_policy)
    }

    /// Build a router from a configuration, validating it first.
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_loaded(load_from_config(config)?))
    }

    pub fn from_loaded(loaded: LoadedConfig) -> Self {
        Self::from_parts(
            Registry::from_snapshot(loaded.snapshot),
            HealthTracker::new(loaded.health),
            loaded.default_policy,
        )
    }

    fn from_parts(registry: Registry, health: HealthTracker, default_policy: RoutingPolicy) -> Self {
        let active = ActiveConfig {
            snapshot: registry.snapshot(),
            default_policy: Arc::new(default_policy),
            health: Arc::new(health.config()),
        };
        let health = Arc::new(health);
        let clients = Arc::new(ProviderClients::new());
        Self {
            registry,
            active: ArcSwap::from_pointee(active),
            dispatcher: Dispatcher::new(Arc::clone(&health), Arc::clone(&clients)),
            health,
            clients,
            write_lock: Mutex::new(()),
        }
    }

    /// The provider snapshot current decisions are made against.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.active.load().snapshot)
    }

    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    /// Attach the client serving `client.id()`, replacing any previous one.
    pub fn attach_client(&self, client: Arc<dyn ProviderClient>) {
        let id = client.id().to_string();
        if self.clients.attach(client).is_some() {
            tracing::debug!(provider_id = %id, "Provider client replaced");
        }
    }

    pub fn detach_client(&self, provider_id: &str) -> bool {
        self.clients.detach(provider_id).is_some()
    }

    /// Add or update a provider at runtime.
    ///
    /// Health history is discarded when an existing provider's descriptor
    /// actually changes.
    pub fn register_provider(&self, descriptor: ProviderDescriptor) {
        let _guard = self.write_lock.lock();
        let id = descriptor.id.clone();
        let replacement = descriptor.clone();
        match self.registry.register(descriptor) {
            Some(previous) if *previous != replacement => {
                self.health.reset(&id);
                tracing::info!(provider_id = %id, "Provider updated");
            }
            Some(_) => {}
            None => tracing::info!(provider_id = %id, "Provider registered"),
        }
        self.publish_snapshot();
    }

    /// Remove a provider and forget its health.
    pub fn remove_provider(&self, provider_id: &str) -> Result<Arc<ProviderDescriptor>, RouterError> {
        let _guard = self.write_lock.lock();
        let removed = self.registry.remove_provider(provider_id)?;
        self.health.reset(provider_id);
        self.publish_snapshot();
        tracing::info!(provider_id = provider_id, "Provider removed");
        Ok(removed)
    }

    /// Current router-wide default policy.
    pub fn default_policy(&self) -> RoutingPolicy {
        RoutingPolicy::clone(&self.active.load().default_policy)
    }

    pub fn set_default_policy(&self, policy: RoutingPolicy) {
        let _guard = self.write_lock.lock();
        tracing::info!(strategy = %policy.strategy, "Default routing policy replaced");
        let current = self.active.load_full();
        self.active.store(Arc::new(ActiveConfig {
            snapshot: Arc::clone(&current.snapshot),
            default_policy: Arc::new(policy),
            health: Arc::clone(&current.health),
        }));
    }

    /// Republish the registry's latest snapshot with the current policy and
    /// thresholds. Callers hold `write_lock`.
    fn publish_snapshot(&self) {
        let current = self.active.load_full();
        self.active.store(Arc::new(ActiveConfig {
            snapshot: self.registry.snapshot(),
            default_policy: Arc::clone(&current.default_policy),
            health: Arc::clone(&current.health),
        }));
    }

    /// Compute the candidate list for a request without dispatching it.
    ///
    /// Uses the request's own policy when present, else the default.
    pub fn decide(&self, request: &ChatRequest) -> Result<RoutingDecision, RoutingError> {
        let active = self.active.load_full();
        let view = self.health.view_with(&active.snapshot, &active.health);
        let policy = request
            .routing_policy
            .as_ref()
            .unwrap_or(active.default_policy.as_ref());

        select_candidates(request, policy, &active.snapshot, &view).inspect_err(|e| {
            metrics::record_no_provider(e.reason().as_tag());
        })
    }

    /// Route a request: select candidates, then dispatch with failover.
    pub async fn route(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, RouterError> {
        let decision = self.decide(request)?;
        self.dispatcher.execute(request, &decision, cancel).await
    }

    /// Apply a new configuration atomically.
    ///
    /// The whole configuration is validated first; on error nothing changes.
    /// Providers, default policy and health thresholds are published together.
    /// Requests already holding a decision keep their descriptors. Health of
    /// changed and removed providers is reset.
    pub fn reload(&self, config: &RouterConfig) -> Result<ReloadSummary, ConfigError> {
        let loaded = load_from_config(config)?;
        let _guard = self.write_lock.lock();

        let previous = self.registry.snapshot();
        let mut summary = ReloadSummary::default();
        let mut incoming: HashMap<&str, &ProviderDescriptor> = HashMap::new();
        for provider in loaded.snapshot.iter() {
            incoming.insert(provider.id.as_str(), provider.as_ref());
            match previous.get(&provider.id) {
                None => summary.added.push(provider.id.clone()),
                Some(old) if old.as_ref() != provider.as_ref() => {
                    summary.changed.push(provider.id.clone())
                }
                Some(_) => summary.unchanged += 1,
            }
        }
        for provider in previous.iter() {
            if !incoming.contains_key(provider.id.as_str()) {
                summary.removed.push(provider.id.clone());
            }
        }

        for id in summary.changed.iter().chain(&summary.removed) {
            self.health.reset(id);
        }
        self.health.set_config(loaded.health.clone());
        self.registry.replace(loaded.snapshot);
        let snapshot = self.registry.snapshot();
        summary.generation = snapshot.generation();
        self.active.store(Arc::new(ActiveConfig {
            snapshot: Arc::clone(&snapshot),
            default_policy: Arc::new(loaded.default_policy),
            health: Arc::new(loaded.health),
        }));

        metrics::update_provider_gauges(&snapshot, &self.health);
        tracing::info!(
            generation = summary.generation,
            added = ?summary.added,
            removed = ?summary.removed,
            changed = ?summary.changed,
            unchanged = summary.unchanged,
            "Configuration reloaded"
        );
        Ok(summary)
    }

    /// Status of one registered provider.
    pub fn provider_status(&self, provider_id: &str) -> Result<ProviderStatus, RouterError> {
        let snapshot = self.snapshot();
        let descriptor = snapshot
            .get(provider_id)
            .ok_or_else(|| RegistryError::ProviderNotFound(provider_id.to_string()))?;
        Ok(self.status_of(descriptor))
    }

    /// Status of every registered provider.
    pub fn status_report(&self) -> StatusReport {
        let active = self.active.load_full();
        StatusReport {
            generation: active.snapshot.generation(),
            default_strategy: active.default_policy.strategy,
            providers: active.snapshot.iter().map(|p| self.status_of(p)).collect(),
        }
    }

    fn status_of(&self, descriptor: &ProviderDescriptor) -> ProviderStatus {
        ProviderStatus {
            id: descriptor.id.clone(),
            enabled: descriptor.enabled,
            priority: descriptor.priority,
            cost_per_unit: descriptor.cost_per_unit,
            max_requests_per_minute: descriptor.max_requests_per_minute,
            capabilities: descriptor.capabilities.clone(),
            client_attached: self.clients.contains(&descriptor.id),
            health: self.health.status(&descriptor.id),
        }
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new(RoutingPolicy::failover(true))
    }
}
