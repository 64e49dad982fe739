//! Routing Policy Engine
//!
//! Turns a request, a policy, a registry snapshot and a health view into an
//! ordered list of candidate providers. Selection is a pure function of its
//! inputs, so the same inputs always produce the same decision.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

pub mod error;
pub mod policy;
pub mod request;
pub mod strategies;

pub use error::{NoProviderReason, RoutingError};
pub use policy::RoutingPolicy;
pub use request::{ChatMessage, ChatRequest};
pub use strategies::RoutingStrategy;

use crate::health::{HealthStatus, HealthView};
use crate::registry::{Capability, ProviderDescriptor, RegistrySnapshot};

/// Ordered candidates for one request.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Strategy that produced the ranking
    pub strategy: RoutingStrategy,
    /// Candidates in attempt order
    pub candidates: Vec<Arc<ProviderDescriptor>>,
    /// Registry generation the decision was computed against
    pub generation: u64,
    /// Set when no provider met the cost ceiling and the cheapest was used
    pub cost_ceiling_relaxed: bool,
}

impl RoutingDecision {
    /// Candidate identifiers in attempt order.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.candidates.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Select and rank candidate providers for a request.
///
/// Disabled providers, providers not serving the requested model,
/// unavailable providers and providers at their request quota are never
/// returned.
///
/// # Errors
///
/// Returns `RoutingError::NoProviderAvailable` when the filtered list is empty.
///
/// # Example
///
/// ```
/// use model_router::health::HealthView;
/// use model_router::registry::{ProviderDescriptor, RegistrySnapshot};
/// use model_router::routing::{select_candidates, ChatRequest, RoutingPolicy};
///
/// let snapshot = RegistrySnapshot::from_descriptors(vec![
///     ProviderDescriptor::new("a").with_cost(0.01).with_priority(5),
///     ProviderDescriptor::new("b").with_cost(0.08).with_priority(10),
/// ])
/// .unwrap();
///
/// let decision = select_candidates(
///     &ChatRequest::new("hello"),
///     &RoutingPolicy::cost_optimized(Some(0.05)),
///     &snapshot,
///     &HealthView::default(),
/// )
/// .unwrap();
/// assert_eq!(decision.provider_ids(), vec!["a"]);
/// ```
pub fn select_candidates(
    request: &ChatRequest,
    policy: &RoutingPolicy,
    snapshot: &RegistrySnapshot,
    health: &HealthView,
) -> Result<RoutingDecision, RoutingError> {
    let reject = |reason: NoProviderReason| {
        tracing::debug!(strategy = %policy.strategy, %reason, "No candidate provider");
        RoutingError::NoProviderAvailable {
            strategy: policy.strategy,
            reason,
        }
    };

    let mut pool: Vec<&Arc<ProviderDescriptor>> = snapshot.iter().filter(|p| p.enabled).collect();
    if pool.is_empty() {
        return Err(reject(NoProviderReason::NoneConfigured));
    }

    if let Some(model) = &request.model {
        pool.retain(|p| p.serves_model(model));
        if pool.is_empty() {
            return Err(reject(NoProviderReason::ModelNotServed {
                model: model.clone(),
            }));
        }
    }

    if policy.strategy == RoutingStrategy::CapabilityBased {
        let required = &policy.required_capabilities;
        let matching: Vec<_> = pool
            .iter()
            .copied()
            .filter(|p| required.is_subset(&p.capabilities))
            .collect();
        if matching.is_empty() {
            return Err(reject(NoProviderReason::CapabilityMismatch {
                missing: closest_missing(&pool, required),
            }));
        }
        pool = matching;
    }

    let mut eligible = Vec::with_capacity(pool.len());
    let mut rate_limited = 0usize;
    for provider in pool {
        let reading = health.get(&provider.id);
        if reading.status == HealthStatus::Unavailable {
            continue;
        }
        if !reading.within_rate_limit(provider.max_requests_per_minute) {
            rate_limited += 1;
            continue;
        }
        eligible.push((provider, reading.status, reading.probe_due));
    }
    if eligible.is_empty() {
        let reason = if rate_limited > 0 {
            NoProviderReason::RateLimited
        } else {
            NoProviderReason::Unhealthy
        };
        return Err(reject(reason));
    }

    let mut cost_ceiling_relaxed = false;
    let candidates: Vec<Arc<ProviderDescriptor>> = match policy.strategy {
        RoutingStrategy::CostOptimized => {
            let mut ranked: Vec<_> = eligible.into_iter().map(|(p, _, _)| p).collect();
            ranked.sort_by(|a, b| by_cost(a, b));
            let within: Vec<_> = ranked
                .iter()
                .copied()
                .filter(|p| policy.max_cost.map_or(true, |max| p.cost_per_unit <= max))
                .collect();
            if !within.is_empty() {
                within.into_iter().cloned().collect()
            } else if policy.strict_cost_ceiling {
                return Err(reject(NoProviderReason::CostCeiling));
            } else {
                cost_ceiling_relaxed = true;
                tracing::debug!(
                    max_cost = ?policy.max_cost,
                    provider_id = %ranked[0].id,
                    "No provider within cost ceiling, using cheapest"
                );
                vec![Arc::clone(ranked[0])]
            }
        }
        RoutingStrategy::Failover => {
            // Probes rank with healthy providers so a recovered provider is retried.
            let (mut primary, mut degraded): (Vec<_>, Vec<_>) = eligible
                .into_iter()
                .partition(|(_, status, probe_due)| *status == HealthStatus::Healthy || *probe_due);
            primary.sort_by(|a, b| by_priority(a.0, b.0));
            degraded.sort_by(|a, b| by_priority(a.0, b.0));

            let has_healthy = primary.iter().any(|(_, status, _)| *status == HealthStatus::Healthy);
            if !has_healthy && policy.fallback_enabled {
                primary.extend(degraded);
            }
            if primary.is_empty() {
                return Err(reject(NoProviderReason::Unhealthy));
            }
            primary.into_iter().map(|(p, _, _)| Arc::clone(p)).collect()
        }
        RoutingStrategy::CapabilityBased => {
            let mut scored: Vec<_> = eligible
                .into_iter()
                .map(|(p, _, _)| (capability_score(p, policy), p))
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| by_priority(a.1, b.1)));
            scored.into_iter().map(|(_, p)| Arc::clone(p)).collect()
        }
    };

    tracing::debug!(
        strategy = %policy.strategy,
        generation = snapshot.generation(),
        candidates = ?candidates.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        "Routing decision made"
    );

    Ok(RoutingDecision {
        strategy: policy.strategy,
        candidates,
        generation: snapshot.generation(),
        cost_ceiling_relaxed,
    })
}

fn by_cost(a: &ProviderDescriptor, b: &ProviderDescriptor) -> Ordering {
    a.cost_per_unit
        .total_cmp(&b.cost_per_unit)
        .then_with(|| by_priority(a, b))
}

fn by_priority(a: &ProviderDescriptor, b: &ProviderDescriptor) -> Ordering {
    a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id))
}

/// Required capabilities count once each; preferred ones add to the score.
fn capability_score(provider: &ProviderDescriptor, policy: &RoutingPolicy) -> usize {
    policy.required_capabilities.len()
        + policy
            .preferred_capabilities
            .intersection(&provider.capabilities)
            .count()
}

/// Capabilities missing from the provider that covers the most of `required`.
fn closest_missing(
    pool: &[&Arc<ProviderDescriptor>],
    required: &BTreeSet<Capability>,
) -> Vec<Capability> {
    pool.iter()
        .map(|p| required.difference(&p.capabilities).copied().collect::<Vec<_>>())
        .min_by_key(|missing| missing.len())
        .unwrap_or_else(|| required.iter().copied().collect())
}
