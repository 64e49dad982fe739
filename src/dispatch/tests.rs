//! Unit tests for the dispatch executor.

use super::*;
use crate::health::HealthStatus;
use crate::provider::{ProviderClient, ProviderErrorKind};
use crate::registry::ProviderDescriptor;
use crate::routing::RoutingStrategy;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

enum Behavior {
    Succeed,
    Fail,
    Sleep(Duration),
}

struct MockClient {
    id: String,
    behavior: Behavior,
    calls: AtomicU32,
}

impl MockClient {
    fn new(id: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behavior,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for MockClient {
    fn id(&self) -> &str {
        &self.id
    }

    async fn call(&self, _request: &ChatRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed => Ok(ProviderResponse::new(format!("from {}", self.id), 7, 1)),
            Behavior::Fail => Err(ProviderError::rejected("503 service unavailable")),
            Behavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(ProviderResponse::new("late", 1, duration.as_millis() as u64))
            }
        }
    }
}

fn decision(providers: Vec<ProviderDescriptor>) -> RoutingDecision {
    RoutingDecision {
        strategy: RoutingStrategy::Failover,
        candidates: providers.into_iter().map(Arc::new).collect(),
        generation: 1,
        cost_ceiling_relaxed: false,
    }
}

fn setup(clients: Vec<Arc<MockClient>>) -> (Dispatcher, Arc<HealthTracker>) {
    let health = Arc::new(HealthTracker::default());
    let set = Arc::new(ProviderClients::new());
    for client in clients {
        set.attach(client);
    }
    (Dispatcher::new(Arc::clone(&health), set), health)
}

#[tokio::test(start_paused = true)]
async fn test_first_success_wins() {
    let a = MockClient::new("a", Behavior::Succeed);
    let b = MockClient::new("b", Behavior::Succeed);
    let (dispatcher, health) = setup(vec![a.clone(), b.clone()]);

    let outcome = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![ProviderDescriptor::new("a"), ProviderDescriptor::new("b")]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "a");
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.response.content, "from a");
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 0);
    assert_eq!(health.status("a").recent_request_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failover_records_failure_and_advances() {
    let a = MockClient::new("a", Behavior::Fail);
    let b = MockClient::new("b", Behavior::Succeed);
    let (dispatcher, health) = setup(vec![a.clone(), b.clone()]);

    let outcome = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![ProviderDescriptor::new("a"), ProviderDescriptor::new("b")]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "b");
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].provider_id, "a");
    assert_eq!(health.status("a").status, HealthStatus::Degraded);
    assert_eq!(health.status("b").status, HealthStatus::Healthy);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_lists_failures_in_order() {
    let (dispatcher, _) = setup(vec![
        MockClient::new("a", Behavior::Fail),
        MockClient::new("b", Behavior::Fail),
        MockClient::new("c", Behavior::Fail),
    ]);

    let err = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![
                ProviderDescriptor::new("a"),
                ProviderDescriptor::new("b"),
                ProviderDescriptor::new("c"),
            ]),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        RouterError::AllProvidersFailed { failures } => {
            let ids: Vec<_> = failures.iter().map(|f| f.provider_id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b", "c"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_counts_as_failure() {
    let slow = MockClient::new("slow", Behavior::Sleep(Duration::from_secs(10)));
    let fast = MockClient::new("fast", Behavior::Succeed);
    let (dispatcher, health) = setup(vec![slow, fast]);

    let outcome = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![
                ProviderDescriptor::new("slow").with_timeout(Duration::from_secs(1)),
                ProviderDescriptor::new("fast"),
            ]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "fast");
    assert_eq!(outcome.failures[0].error.kind, ProviderErrorKind::Timeout);
    assert_eq!(health.status("slow").consecutive_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_records_no_outcome() {
    let slow = MockClient::new("slow", Behavior::Sleep(Duration::from_secs(10)));
    let (dispatcher, health) = setup(vec![slow]);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![ProviderDescriptor::new("slow")]),
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Cancelled));
    let reading = health.status("slow");
    assert_eq!(reading.last_latency_ms, None);
    assert_eq!(reading.consecutive_failures, 0);
    // the slot was claimed before the call started
    assert_eq!(reading.recent_request_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_client_is_failure_without_health_outcome() {
    let (dispatcher, health) = setup(vec![MockClient::new("b", Behavior::Succeed)]);

    let outcome = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![ProviderDescriptor::new("a"), ProviderDescriptor::new("b")]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "b");
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.failures[0].error.kind, ProviderErrorKind::NotConfigured);
    assert!(health.all_statuses().iter().all(|(id, _)| id != "a"));
}

#[tokio::test(start_paused = true)]
async fn test_all_rate_limited_reports_no_provider() {
    let a = MockClient::new("a", Behavior::Succeed);
    let (dispatcher, health) = setup(vec![a.clone()]);
    assert!(health.try_acquire("a", 1));

    let err = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![ProviderDescriptor::new("a").with_rate_limit(1)]),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.no_provider_reason(), Some(&NoProviderReason::RateLimited));
    assert!(err.is_retryable());
    assert_eq!(a.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_candidate_skipped_silently() {
    let (dispatcher, health) = setup(vec![
        MockClient::new("a", Behavior::Succeed),
        MockClient::new("b", Behavior::Succeed),
    ]);
    assert!(health.try_acquire("a", 1));

    let outcome = dispatcher
        .execute(
            &ChatRequest::new("hi"),
            &decision(vec![
                ProviderDescriptor::new("a").with_rate_limit(1),
                ProviderDescriptor::new("b"),
            ]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "b");
    assert_eq!(outcome.rate_limited, vec!["a".to_string()]);
    assert!(outcome.failures.is_empty());
}
