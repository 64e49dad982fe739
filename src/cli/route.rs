//! Route command implementation (dry run)

use crate::cli::output::{format_decision_json, format_decision_table};
use crate::cli::{load_config, RouteArgs};
use crate::registry::Capability;
use crate::router::ModelRouter;
use crate::routing::{ChatRequest, RoutingPolicy, RoutingStrategy};

/// Handle `model-router route`
///
/// Health starts fresh, so the preview shows what a newly started router
/// would decide.
pub fn handle_route(args: &RouteArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let router = ModelRouter::from_config(&config)?;
    preview_route(args, &router)
}

/// Compute and format the decision for the request described by `args`.
pub fn preview_route(
    args: &RouteArgs,
    router: &ModelRouter,
) -> Result<String, Box<dyn std::error::Error>> {
    let policy = build_policy(args, router.default_policy())?;
    let mut request = ChatRequest::new("").with_policy(policy);
    request.model = args.model.clone();

    let decision = router.decide(&request)?;
    if args.json {
        Ok(format_decision_json(&decision)?)
    } else {
        Ok(format_decision_table(&decision))
    }
}

/// Start from the default policy and apply the flags given on the command line.
fn build_policy(
    args: &RouteArgs,
    default: RoutingPolicy,
) -> Result<RoutingPolicy, Box<dyn std::error::Error>> {
    let mut policy = default;
    if let Some(strategy) = &args.strategy {
        policy.strategy = strategy.parse::<RoutingStrategy>()?;
    }
    if args.max_cost.is_some() {
        policy.max_cost = args.max_cost;
    }
    if args.strict {
        policy.strict_cost_ceiling = true;
    }
    if !args.require.is_empty() {
        policy.required_capabilities = parse_capabilities(&args.require)?;
    }
    if !args.prefer.is_empty() {
        policy.preferred_capabilities = parse_capabilities(&args.prefer)?;
    }
    if args.no_fallback {
        policy.fallback_enabled = false;
    }
    Ok(policy)
}

fn parse_capabilities(
    tags: &[String],
) -> Result<std::collections::BTreeSet<Capability>, Box<dyn std::error::Error>> {
    Ok(tags
        .iter()
        .map(|t| t.parse::<Capability>())
        .collect::<Result<_, _>>()?)
}
