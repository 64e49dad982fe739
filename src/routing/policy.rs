//! Routing policy value object

use super::strategies::RoutingStrategy;
use crate::registry::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Strategy plus its parameters, supplied per request or as the router default.
///
/// # Example
///
/// ```
/// use model_router::routing::{RoutingPolicy, RoutingStrategy};
///
/// let policy = RoutingPolicy::cost_optimized(Some(0.05));
/// assert_eq!(policy.strategy, RoutingStrategy::CostOptimized);
/// assert_eq!(policy.max_cost, Some(0.05));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingPolicy {
    pub strategy: RoutingStrategy,
    /// Cost ceiling for `cost_optimized`
    pub max_cost: Option<f64>,
    /// Fail instead of falling back to the cheapest provider when nothing
    /// meets `max_cost`
    pub strict_cost_ceiling: bool,
    /// Capabilities every candidate must have
    pub required_capabilities: BTreeSet<Capability>,
    /// Capabilities that raise a candidate's rank under `capability_based`
    pub preferred_capabilities: BTreeSet<Capability>,
    /// Allow degraded providers as a last resort under `failover`
    pub fallback_enabled: bool,
}

impl RoutingPolicy {
    pub fn cost_optimized(max_cost: Option<f64>) -> Self {
        Self {
            strategy: RoutingStrategy::CostOptimized,
            max_cost,
            ..Self::default()
        }
    }

    pub fn failover(fallback_enabled: bool) -> Self {
        Self {
            strategy: RoutingStrategy::Failover,
            fallback_enabled,
            ..Self::default()
        }
    }

    pub fn capability_based(required: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            strategy: RoutingStrategy::CapabilityBased,
            required_capabilities: required.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_preferred(mut self, preferred: impl IntoIterator<Item = Capability>) -> Self {
        self.preferred_capabilities = preferred.into_iter().collect();
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_cost_ceiling = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = RoutingPolicy::default();
        assert_eq!(policy.strategy, RoutingStrategy::Failover);
        assert!(policy.max_cost.is_none());
        assert!(!policy.fallback_enabled);
        assert!(!policy.strict_cost_ceiling);
    }

    #[test]
    fn test_policy_from_toml() {
        let toml = r#"
            strategy = "capability_based"
            required_capabilities = ["reasoning", "code_generation"]
        "#;
        let policy: RoutingPolicy = toml::from_str(toml).unwrap();
        assert_eq!(policy.strategy, RoutingStrategy::CapabilityBased);
        assert!(policy.required_capabilities.contains(&Capability::Reasoning));
        assert!(policy.required_capabilities.contains(&Capability::CodeGeneration));
    }

    #[test]
    fn test_policy_unknown_capability_rejected() {
        let toml = r#"required_capabilities = ["mind_reading"]"#;
        assert!(toml::from_str::<RoutingPolicy>(toml).is_err());
    }
}
