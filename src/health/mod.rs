//! Health & Rate Tracker.
//!
//! Records recent call outcomes and dispatch timestamps per provider, derives
//! a health status with half-open recovery, and enforces per-minute quotas
//! with a sliding window.

mod config;
mod state;


pub use config::*;
pub use state::*;

use crate::registry::RegistrySnapshot;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::time::Instant;

/// Shared per-provider health and quota bookkeeping.
///
/// Records are created lazily on first write. Every update holds a single
/// DashMap shard lock for the duration of a few arithmetic operations.
pub struct HealthTracker {
    config: ArcSwap<HealthConfig>,
    records: DashMap<String, HealthRecord>,
}

impl HealthTracker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            records: DashMap::new(),
        }
    }

    /// Current thresholds.
    pub fn config(&self) -> HealthConfig {
        HealthConfig::clone(&self.config.load())
    }

    /// Replace thresholds; existing records are kept.
    pub fn set_config(&self, config: HealthConfig) {
        self.config.store(std::sync::Arc::new(config));
    }

    /// Record the outcome of a provider call and recompute its status.
    pub fn record_outcome(&self, provider_id: &str, success: bool, latency_ms: u64) {
        let config = self.config.load();
        let mut record = self.records.entry(provider_id.to_string()).or_default();
        if let Some((old_status, new_status)) =
            record.record(success, latency_ms, Instant::now(), &config)
        {
            tracing::info!(
                provider_id = provider_id,
                old_status = %old_status,
                new_status = %new_status,
                consecutive_failures = record.view(Instant::now(), &config).consecutive_failures,
                "Provider status changed"
            );
        }
    }

    /// Whether the provider has quota left in the trailing window.
    ///
    /// Read-only: use [`HealthTracker::try_acquire`] to actually claim a slot.
    pub fn is_within_rate_limit(&self, provider_id: &str, max_requests_per_minute: u32) -> bool {
        self.status(provider_id)
            .within_rate_limit(max_requests_per_minute)
    }

    /// Atomically claim one request slot for the provider.
    ///
    /// Returns `false` when the provider is at its quota; nothing is counted
    /// in that case.
    pub fn try_acquire(&self, provider_id: &str, max_requests_per_minute: u32) -> bool {
        let config = self.config.load();
        let mut record = self.records.entry(provider_id.to_string()).or_default();
        record.try_acquire(Instant::now(), max_requests_per_minute, &config)
    }

    /// Health status of one provider. Unknown providers report healthy with
    /// no traffic.
    pub fn status(&self, provider_id: &str) -> ProviderHealth {
        let config = self.config.load();
        self.records
            .get(provider_id)
            .map(|record| record.view(Instant::now(), &config))
            .unwrap_or_default()
    }

    /// Health of every provider in `snapshot`, taken once for a routing decision.
    pub fn view_for(&self, snapshot: &RegistrySnapshot) -> HealthView {
        self.view_with(snapshot, &self.config.load())
    }

    /// Like [`HealthTracker::view_for`], judged against explicit thresholds.
    pub fn view_with(&self, snapshot: &RegistrySnapshot, config: &HealthConfig) -> HealthView {
        let now = Instant::now();
        let entries = snapshot
            .iter()
            .map(|p| {
                let health = self
                    .records
                    .get(&p.id)
                    .map(|record| record.view(now, config))
                    .unwrap_or_default();
                (p.id.clone(), health)
            })
            .collect();
        HealthView { entries }
    }

    /// Every tracked provider's status, sorted by provider id.
    pub fn all_statuses(&self) -> Vec<(String, ProviderHealth)> {
        let config = self.config.load();
        let now = Instant::now();
        let mut statuses: Vec<_> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().view(now, &config)))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    /// Forget everything known about a provider.
    pub fn reset(&self, provider_id: &str) {
        if self.records.remove(provider_id).is_some() {
            tracing::debug!(provider_id = provider_id, "Health record reset");
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

/// Immutable health readings used for one routing decision.
#[derive(Debug, Clone, Default)]
pub struct HealthView {
    entries: HashMap<String, ProviderHealth>,
}

impl HealthView {
    /// Health of a provider; providers without readings are healthy and idle.
    pub fn get(&self, provider_id: &str) -> ProviderHealth {
        self.entries.get(provider_id).cloned().unwrap_or_default()
    }

    /// Override one provider's reading.
    pub fn insert(&mut self, provider_id: impl Into<String>, health: ProviderHealth) {
        self.entries.insert(provider_id.into(), health);
    }
}

impl FromIterator<(String, ProviderHealth)> for HealthView {
    fn from_iter<T: IntoIterator<Item = (String, ProviderHealth)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
