//! Provider configuration

use super::error::ValidationIssue;
use crate::registry::{Capability, ProviderDescriptor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `[[providers]]` entry.
///
/// Numeric and tag fields are kept loose here so that every problem can be
/// reported in one validation pass instead of failing at the first bad value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-call timeout; falls back to `router.default_timeout_ms`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Model names served; empty means any model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

fn default_priority() -> i32 {
    50
}

fn default_max_requests_per_minute() -> i64 {
    60
}

fn default_enabled() -> bool {
    true
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: Vec::new(),
            cost_per_unit: 0.0,
            priority: default_priority(),
            max_requests_per_minute: default_max_requests_per_minute(),
            enabled: default_enabled(),
            timeout_ms: None,
            models: Vec::new(),
        }
    }

    /// Collect every problem with this entry. `index` is its position in
    /// the `providers` array and only used for field paths.
    pub fn problems(&self, index: usize) -> Vec<ValidationIssue> {
        let field = |name: &str| format!("providers[{}].{}", index, name);
        let mut issues = Vec::new();

        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::new(field("id"), "id cannot be empty"));
        }
        for tag in &self.capabilities {
            if tag.parse::<Capability>().is_err() {
                issues.push(ValidationIssue::new(
                    field("capabilities"),
                    format!("unknown capability '{}'", tag),
                ));
            }
        }
        if !self.cost_per_unit.is_finite() || self.cost_per_unit < 0.0 {
            issues.push(ValidationIssue::new(
                field("cost_per_unit"),
                format!("must be a non-negative number, got {}", self.cost_per_unit),
            ));
        }
        if self.max_requests_per_minute <= 0 || self.max_requests_per_minute > u32::MAX as i64 {
            issues.push(ValidationIssue::new(
                field("max_requests_per_minute"),
                format!("must be positive, got {}", self.max_requests_per_minute),
            ));
        }
        if self.timeout_ms == Some(0) {
            issues.push(ValidationIssue::new(field("timeout_ms"), "must be non-zero"));
        }
        issues
    }

    /// Build the descriptor. Call only after [`ProviderConfig::problems`]
    /// came back empty; unknown tags are dropped here.
    pub fn to_descriptor(&self, default_timeout: Duration) -> ProviderDescriptor {
        let capabilities = self
            .capabilities
            .iter()
            .filter_map(|tag| tag.parse::<Capability>().ok());
        let mut descriptor = ProviderDescriptor::new(self.id.trim())
            .with_capabilities(capabilities)
            .with_cost(self.cost_per_unit)
            .with_priority(self.priority)
            .with_rate_limit(self.max_requests_per_minute.clamp(1, u32::MAX as i64) as u32)
            .with_timeout(
                self.timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default_timeout),
            )
            .with_models(self.models.iter().cloned());
        if !self.enabled {
            descriptor = descriptor.disabled();
        }
        descriptor
    }
}
