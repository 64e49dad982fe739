//! `[router]` section: router-wide defaults

use super::error::ValidationIssue;
use crate::registry::Capability;
use crate::routing::{RoutingPolicy, RoutingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Router-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSection {
    /// Per-call timeout for providers that don't set their own
    pub default_timeout_ms: u64,
    /// Policy used when a request carries no override
    pub default_policy: PolicyConfig,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            default_policy: PolicyConfig::default(),
        }
    }
}

impl RouterSection {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn problems(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.default_timeout_ms == 0 {
            issues.push(ValidationIssue::new(
                "router.default_timeout_ms",
                "must be non-zero",
            ));
        }
        if let Err(mut policy_issues) = self.default_policy.to_policy() {
            issues.append(&mut policy_issues);
        }
        issues
    }
}

/// `[router.default_policy]` as written in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cost: Option<f64>,
    pub strict_cost_ceiling: bool,
    pub required_capabilities: Vec<String>,
    pub preferred_capabilities: Vec<String>,
    pub fallback_enabled: bool,
    /// Anything else; reported as unknown parameters
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            strategy: RoutingStrategy::default().to_string(),
            max_cost: None,
            strict_cost_ceiling: false,
            required_capabilities: Vec::new(),
            preferred_capabilities: Vec::new(),
            fallback_enabled: true,
            unknown: BTreeMap::new(),
        }
    }
}

impl PolicyConfig {
    /// Convert to a policy, collecting every problem on failure.
    pub fn to_policy(&self) -> Result<RoutingPolicy, Vec<ValidationIssue>> {
        const FIELD: &str = "router.default_policy";
        let mut issues = Vec::new();

        let strategy = match self.strategy.parse::<RoutingStrategy>() {
            Ok(strategy) => Some(strategy),
            Err(e) => {
                issues.push(ValidationIssue::new(format!("{}.strategy", FIELD), e));
                None
            }
        };
        if let Some(max_cost) = self.max_cost {
            if !max_cost.is_finite() || max_cost < 0.0 {
                issues.push(ValidationIssue::new(
                    format!("{}.max_cost", FIELD),
                    format!("must be a non-negative number, got {}", max_cost),
                ));
            }
        }
        let required = parse_tags(
            &self.required_capabilities,
            &format!("{}.required_capabilities", FIELD),
            &mut issues,
        );
        let preferred = parse_tags(
            &self.preferred_capabilities,
            &format!("{}.preferred_capabilities", FIELD),
            &mut issues,
        );
        for key in self.unknown.keys() {
            issues.push(ValidationIssue::new(
                format!("{}.{}", FIELD, key),
                "unknown policy parameter",
            ));
        }

        match strategy {
            Some(strategy) if issues.is_empty() => Ok(RoutingPolicy {
                strategy,
                max_cost: self.max_cost,
                strict_cost_ceiling: self.strict_cost_ceiling,
                required_capabilities: required,
                preferred_capabilities: preferred,
                fallback_enabled: self.fallback_enabled,
            }),
            _ => Err(issues),
        }
    }
}

fn parse_tags(
    tags: &[String],
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> BTreeSet<Capability> {
    let mut parsed = BTreeSet::new();
    for tag in tags {
        match tag.parse::<Capability>() {
            Ok(capability) => {
                parsed.insert(capability);
            }
            Err(_) => issues.push(ValidationIssue::new(
                field,
                format!("unknown capability '{}'", tag),
            )),
        }
    }
    parsed
}
