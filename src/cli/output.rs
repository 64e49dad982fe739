//! Output formatting helpers for CLI commands

use crate::config::ValidationIssue;
use crate::health::HealthStatus;
use crate::router::ProviderStatus;
use crate::routing::RoutingDecision;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// View model for provider display
#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub id: String,
    pub enabled: bool,
    pub priority: i32,
    pub cost_per_unit: f64,
    pub max_requests_per_minute: u32,
    pub capabilities: Vec<String>,
    pub status: HealthStatus,
}

impl From<&ProviderStatus> for ProviderView {
    fn from(status: &ProviderStatus) -> Self {
        Self {
            id: status.id.clone(),
            enabled: status.enabled,
            priority: status.priority,
            cost_per_unit: status.cost_per_unit,
            max_requests_per_minute: status.max_requests_per_minute,
            capabilities: status
                .capabilities
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            status: status.health.status,
        }
    }
}

/// View model for one ranked candidate
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub rank: usize,
    pub id: String,
    pub cost_per_unit: f64,
    pub priority: i32,
    pub capabilities: Vec<String>,
}

pub fn candidate_views(decision: &RoutingDecision) -> Vec<CandidateView> {
    decision
        .candidates
        .iter()
        .enumerate()
        .map(|(i, p)| CandidateView {
            rank: i + 1,
            id: p.id.clone(),
            cost_per_unit: p.cost_per_unit,
            priority: p.priority,
            capabilities: p.capabilities.iter().map(|c| c.as_str().to_string()).collect(),
        })
        .collect()
}

/// Colored status label
pub fn status_label(status: HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "Healthy".green().to_string(),
        HealthStatus::Degraded => "Degraded".yellow().to_string(),
        HealthStatus::Unavailable => "Unavailable".red().to_string(),
    }
}

/// Format providers as a table
pub fn format_providers_table(providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "ID",
        "Enabled",
        "Priority",
        "Cost",
        "RPM",
        "Capabilities",
        "Status",
    ]);

    for p in providers {
        let enabled = if p.enabled {
            "yes".to_string()
        } else {
            "no".dimmed().to_string()
        };
        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(enabled),
            Cell::new(p.priority),
            Cell::new(format!("{:.4}", p.cost_per_unit)),
            Cell::new(p.max_requests_per_minute),
            Cell::new(p.capabilities.join(", ")),
            Cell::new(status_label(p.status)),
        ]);
    }

    table.to_string()
}

/// Format providers as JSON
pub fn format_providers_json(providers: &[ProviderView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "providers": providers }))
}

/// Format a routing decision as a table
pub fn format_decision_table(decision: &RoutingDecision) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Provider", "Cost", "Priority", "Capabilities"]);

    for c in candidate_views(decision) {
        table.add_row(vec![
            Cell::new(c.rank),
            Cell::new(&c.id),
            Cell::new(format!("{:.4}", c.cost_per_unit)),
            Cell::new(c.priority),
            Cell::new(c.capabilities.join(", ")),
        ]);
    }

    let mut out = format!("Strategy: {}\n", decision.strategy);
    if decision.cost_ceiling_relaxed {
        out.push_str(&format!(
            "{}\n",
            "No provider within the cost ceiling; using the cheapest".yellow()
        ));
    }
    out.push_str(&table.to_string());
    out
}

/// Format a routing decision as JSON
pub fn format_decision_json(decision: &RoutingDecision) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "strategy": decision.strategy,
        "generation": decision.generation,
        "cost_ceiling_relaxed": decision.cost_ceiling_relaxed,
        "candidates": candidate_views(decision),
    }))
}

/// One line per validation issue
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  {} {}: {}", "✗".red(), i.field, i.message))
        .collect::<Vec<_>>()
        .join("\n")
}
