//! Integration tests for sliding-window request quotas

mod common;

use common::{request, router_with, MockProvider};
use model_router::registry::ProviderDescriptor;
use model_router::routing::{NoProviderReason, RoutingPolicy};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_quota_excludes_provider_until_window_passes() {
    let grok = MockProvider::succeeding("grok");
    let router = router_with(
        RoutingPolicy::failover(true),
        vec![(ProviderDescriptor::new("grok").with_rate_limit(60), grok.clone())],
    );
    let cancel = CancellationToken::new();

    for _ in 0..60 {
        router.route(&request(), &cancel).await.unwrap();
        tokio::time::advance(Duration::from_millis(500)).await;
    }
    assert_eq!(grok.calls(), 60);
    assert_eq!(router.health().status("grok").recent_request_count, 60);

    let err = router.decide(&request()).unwrap_err();
    assert_eq!(err.reason(), &NoProviderReason::RateLimited);
    let err = router.route(&request(), &cancel).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(grok.calls(), 60);

    // one full window after the last call every slot has expired
    tokio::time::advance(Duration::from_secs(60)).await;
    let decision = router.decide(&request()).unwrap();
    assert_eq!(decision.provider_ids(), vec!["grok"]);
    router.route(&request(), &cancel).await.unwrap();
    assert_eq!(grok.calls(), 61);
}

#[tokio::test(start_paused = true)]
async fn test_quota_frees_slots_as_window_slides() {
    let router = router_with(
        RoutingPolicy::failover(true),
        vec![(
            ProviderDescriptor::new("grok").with_rate_limit(2),
            MockProvider::succeeding("grok"),
        )],
    );
    let cancel = CancellationToken::new();

    router.route(&request(), &cancel).await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    router.route(&request(), &cancel).await.unwrap();
    assert!(router.decide(&request()).is_err());

    // only the first request has left the window
    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(router.health().status("grok").recent_request_count, 1);
    router.route(&request(), &cancel).await.unwrap();
    assert!(router.decide(&request()).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_limited_provider_overflows_to_next() {
    let cheap = MockProvider::succeeding("cheap");
    let pricey = MockProvider::succeeding("pricey");
    let router = router_with(
        RoutingPolicy::cost_optimized(None),
        vec![
            (
                ProviderDescriptor::new("cheap").with_cost(0.01).with_rate_limit(3),
                cheap.clone(),
            ),
            (ProviderDescriptor::new("pricey").with_cost(0.05), pricey.clone()),
        ],
    );
    let cancel = CancellationToken::new();

    for _ in 0..5 {
        router.route(&request(), &cancel).await.unwrap();
    }
    assert_eq!(cheap.calls(), 3);
    assert_eq!(pricey.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_routes_never_exceed_quota() {
    let grok = MockProvider::succeeding("grok");
    let router = std::sync::Arc::new(router_with(
        RoutingPolicy::failover(true),
        vec![(ProviderDescriptor::new("grok").with_rate_limit(10), grok.clone())],
    ));

    let handles = (0..25).map(|_| {
        let router = router.clone();
        tokio::spawn(async move { router.route(&request(), &CancellationToken::new()).await })
    });
    let succeeded = futures::future::join_all(handles)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();

    assert_eq!(succeeded, 10);
    assert_eq!(grok.calls(), 10);
}
