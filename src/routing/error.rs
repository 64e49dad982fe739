//! Error types for routing failures

use super::strategies::RoutingStrategy;
use crate::registry::Capability;
use serde::Serialize;
use thiserror::Error;

/// Why no candidate survived filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoProviderReason {
    /// No enabled provider is configured
    NoneConfigured,
    /// No enabled provider serves the requested model
    ModelNotServed { model: String },
    /// No provider has every required capability
    CapabilityMismatch { missing: Vec<Capability> },
    /// No provider is within the cost ceiling (strict mode)
    CostCeiling,
    /// Every matching provider is unavailable
    Unhealthy,
    /// Every matching provider is at its request quota
    RateLimited,
}

impl NoProviderReason {
    /// Transient reasons clear up without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NoProviderReason::Unhealthy | NoProviderReason::RateLimited)
    }

    /// Stable snake_case tag, matching the serialized `reason` field.
    pub fn as_tag(&self) -> &'static str {
        match self {
            NoProviderReason::NoneConfigured => "none_configured",
            NoProviderReason::ModelNotServed { .. } => "model_not_served",
            NoProviderReason::CapabilityMismatch { .. } => "capability_mismatch",
            NoProviderReason::CostCeiling => "cost_ceiling",
            NoProviderReason::Unhealthy => "unhealthy",
            NoProviderReason::RateLimited => "rate_limited",
        }
    }
}

impl std::fmt::Display for NoProviderReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoProviderReason::NoneConfigured => write!(f, "no enabled provider is configured"),
            NoProviderReason::ModelNotServed { model } => {
                write!(f, "no enabled provider serves model '{}'", model)
            }
            NoProviderReason::CapabilityMismatch { missing } => {
                let names: Vec<_> = missing.iter().map(Capability::as_str).collect();
                write!(f, "no provider supports required capabilities [{}]", names.join(", "))
            }
            NoProviderReason::CostCeiling => write!(f, "no provider is within the cost ceiling"),
            NoProviderReason::Unhealthy => write!(f, "all matching providers are unavailable"),
            NoProviderReason::RateLimited => write!(f, "all matching providers are rate limited"),
        }
    }
}

/// Errors that can occur during candidate selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The filtered candidate list is empty
    #[error("No provider available under '{strategy}' policy: {reason}")]
    NoProviderAvailable {
        strategy: RoutingStrategy,
        reason: NoProviderReason,
    },
}

impl RoutingError {
    pub fn reason(&self) -> &NoProviderReason {
        match self {
            RoutingError::NoProviderAvailable { reason, .. } => reason,
        }
    }
}
