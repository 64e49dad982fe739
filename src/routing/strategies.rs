//! Routing strategies for provider selection

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Routing strategy determines how candidates are filtered and ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Cheapest providers first, bounded by an optional cost ceiling
    CostOptimized,

    /// Lowest priority number first; unhealthy providers only as a last resort
    #[default]
    Failover,

    /// Only providers covering every required capability, best match first
    CapabilityBased,
}

impl FromStr for RoutingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cost_optimized" => Ok(RoutingStrategy::CostOptimized),
            "failover" => Ok(RoutingStrategy::Failover),
            "capability_based" => Ok(RoutingStrategy::CapabilityBased),
            _ => Err(format!("Unknown routing strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingStrategy::CostOptimized => write!(f, "cost_optimized"),
            RoutingStrategy::Failover => write!(f, "failover"),
            RoutingStrategy::CapabilityBased => write!(f, "capability_based"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_strategy_default_is_failover() {
        assert_eq!(RoutingStrategy::default(), RoutingStrategy::Failover);
    }

    #[test]
    fn routing_strategy_from_str() {
        assert_eq!(
            "cost_optimized".parse::<RoutingStrategy>().unwrap(),
            RoutingStrategy::CostOptimized
        );
        assert_eq!(
            "failover".parse::<RoutingStrategy>().unwrap(),
            RoutingStrategy::Failover
        );
        assert_eq!(
            "Capability-Based".parse::<RoutingStrategy>().unwrap(),
            RoutingStrategy::CapabilityBased
        );
        assert!("round_robin".parse::<RoutingStrategy>().is_err());
    }

    #[test]
    fn routing_strategy_display_matches_serde() {
        for strategy in [
            RoutingStrategy::CostOptimized,
            RoutingStrategy::Failover,
            RoutingStrategy::CapabilityBased,
        ] {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy));
        }
    }
}
