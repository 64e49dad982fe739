//! Integration tests for policy-driven provider selection

mod common;

use common::{request, router_with, MockProvider};
use model_router::registry::{Capability, ProviderDescriptor};
use model_router::routing::{NoProviderReason, RoutingPolicy};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_cost_optimized_stays_under_ceiling() {
    let a = MockProvider::succeeding("a");
    let b = MockProvider::succeeding("b");
    let router = router_with(
        RoutingPolicy::cost_optimized(Some(0.05)),
        vec![
            (ProviderDescriptor::new("a").with_cost(0.01).with_priority(5), a.clone()),
            (ProviderDescriptor::new("b").with_cost(0.08).with_priority(10), b.clone()),
        ],
    );

    let decision = router.decide(&request()).unwrap();
    assert_eq!(decision.provider_ids(), vec!["a"]);

    let outcome = router.route(&request(), &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.provider_id, "a");
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_capability_based_excludes_partial_matches() {
    let a = MockProvider::succeeding("a");
    let b = MockProvider::succeeding("b");
    let router = router_with(
        RoutingPolicy::capability_based([Capability::Reasoning, Capability::CodeGeneration]),
        vec![
            (
                ProviderDescriptor::new("a").with_capabilities([Capability::TextGeneration]),
                a.clone(),
            ),
            (
                ProviderDescriptor::new("b")
                    .with_capabilities([Capability::Reasoning, Capability::CodeGeneration]),
                b.clone(),
            ),
        ],
    );

    let decision = router.decide(&request()).unwrap();
    assert_eq!(decision.provider_ids(), vec!["b"]);

    let outcome = router.route(&request(), &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.provider_id, "b");
    assert_eq!(a.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_relaxed_ceiling_uses_cheapest() {
    let router = router_with(
        RoutingPolicy::cost_optimized(Some(0.001)),
        vec![
            (ProviderDescriptor::new("grok").with_cost(0.02), MockProvider::succeeding("grok")),
            (ProviderDescriptor::new("gpt").with_cost(0.03), MockProvider::succeeding("gpt")),
        ],
    );

    let decision = router.decide(&request()).unwrap();
    assert!(decision.cost_ceiling_relaxed);
    assert_eq!(decision.provider_ids(), vec!["grok"]);

    let strict = request().with_policy(RoutingPolicy::cost_optimized(Some(0.001)).strict());
    let err = router.decide(&strict).unwrap_err();
    assert_eq!(err.reason(), &NoProviderReason::CostCeiling);
}

#[tokio::test(start_paused = true)]
async fn test_no_provider_error_surfaces_through_route() {
    let router = router_with(
        RoutingPolicy::capability_based([Capability::Vision]),
        vec![(ProviderDescriptor::new("grok"), MockProvider::succeeding("grok"))],
    );

    let err = router.route(&request(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err.no_provider_reason(),
        Some(NoProviderReason::CapabilityMismatch { missing }) if missing == &vec![Capability::Vision]
    ));
    assert!(!err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_model_filter() {
    let router = router_with(
        RoutingPolicy::failover(true),
        vec![
            (
                ProviderDescriptor::new("grok").with_models(["grok-2"]).with_priority(1),
                MockProvider::succeeding("grok"),
            ),
            (
                ProviderDescriptor::new("local").with_models(["llama3"]).with_priority(2),
                MockProvider::succeeding("local"),
            ),
        ],
    );

    let outcome = router
        .route(&request().with_model("llama3"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.provider_id, "local");
}

#[tokio::test(start_paused = true)]
async fn test_decisions_are_deterministic() {
    let router = router_with(
        RoutingPolicy::cost_optimized(None),
        vec![
            (ProviderDescriptor::new("c").with_cost(0.01), MockProvider::succeeding("c")),
            (ProviderDescriptor::new("a").with_cost(0.01), MockProvider::succeeding("a")),
            (ProviderDescriptor::new("b").with_cost(0.01), MockProvider::succeeding("b")),
        ],
    );

    let first = router.decide(&request()).unwrap().provider_ids().join(",");
    for _ in 0..10 {
        assert_eq!(router.decide(&request()).unwrap().provider_ids().join(","), first);
    }
    assert_eq!(first, "a,b,c");
}
