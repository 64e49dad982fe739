//! # Metrics
//!
//! Router metrics recorded through the `metrics` facade. The library never
//! installs a recorder; embedding applications choose the exporter.
//!
//! **Counters:**
//! - `router_requests_total{provider, outcome}` - Provider calls by outcome
//! - `router_failovers_total` - Advances to the next candidate after a failure
//! - `router_rate_limited_total{provider}` - Candidates skipped at their quota
//! - `router_no_provider_total{reason}` - Requests with no usable candidate
//!
//! **Histograms:**
//! - `router_provider_latency_seconds{provider}` - Provider call latency
//!
//! **Gauges:**
//! - `router_providers_total` - Registered providers
//! - `router_providers_healthy` - Providers currently reporting healthy

use crate::health::{HealthStatus, HealthTracker};
use crate::registry::RegistrySnapshot;
use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "router_requests_total";
pub const PROVIDER_LATENCY_SECONDS: &str = "router_provider_latency_seconds";
pub const FAILOVERS_TOTAL: &str = "router_failovers_total";
pub const RATE_LIMITED_TOTAL: &str = "router_rate_limited_total";
pub const NO_PROVIDER_TOTAL: &str = "router_no_provider_total";
pub const PROVIDERS_TOTAL: &str = "router_providers_total";
pub const PROVIDERS_HEALTHY: &str = "router_providers_healthy";

/// Outcome label values for `router_requests_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Error,
    Timeout,
    Cancelled,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Error => "error",
            CallOutcome::Timeout => "timeout",
            CallOutcome::Cancelled => "cancelled",
        }
    }
}

pub fn record_call(provider_id: &str, outcome: CallOutcome, latency: Duration) {
    metrics::counter!(REQUESTS_TOTAL,
        "provider" => provider_id.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    if outcome != CallOutcome::Cancelled {
        metrics::histogram!(PROVIDER_LATENCY_SECONDS, "provider" => provider_id.to_string())
            .record(latency.as_secs_f64());
    }
}

pub fn record_failover() {
    metrics::counter!(FAILOVERS_TOTAL).increment(1);
}

pub fn record_rate_limited(provider_id: &str) {
    metrics::counter!(RATE_LIMITED_TOTAL, "provider" => provider_id.to_string()).increment(1);
}

/// `reason` is the snake_case reason tag, e.g. `rate_limited`.
pub fn record_no_provider(reason: &'static str) {
    metrics::counter!(NO_PROVIDER_TOTAL, "reason" => reason).increment(1);
}

/// Recompute fleet gauges from a snapshot and current health.
pub fn update_provider_gauges(snapshot: &RegistrySnapshot, tracker: &HealthTracker) {
    metrics::gauge!(PROVIDERS_TOTAL).set(snapshot.len() as f64);
    let view = tracker.view_for(snapshot);
    let healthy = snapshot
        .iter()
        .filter(|p| p.enabled && view.get(&p.id).status == HealthStatus::Healthy)
        .count();
    metrics::gauge!(PROVIDERS_HEALTHY).set(healthy as f64);
}
