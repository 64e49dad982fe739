//! Benchmarks for candidate selection with varying provider counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model_router::health::{HealthStatus, HealthView, ProviderHealth};
use model_router::registry::{Capability, ProviderDescriptor, RegistrySnapshot};
use model_router::routing::{select_candidates, ChatRequest, RoutingPolicy};

fn create_provider(id: usize) -> ProviderDescriptor {
    let capabilities = Capability::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| (id + i) % 3 != 0)
        .map(|(_, c)| *c);
    ProviderDescriptor::new(format!("provider-{}", id))
        .with_capabilities(capabilities)
        .with_cost(0.001 * ((id * 7) % 50) as f64)
        .with_priority((id % 5 + 1) as i32)
        .with_rate_limit(600)
}

fn create_fixture(count: usize) -> (RegistrySnapshot, HealthView) {
    let snapshot = RegistrySnapshot::from_descriptors((0..count).map(create_provider))
        .expect("unique ids");
    let health = (0..count)
        .map(|id| {
            let status = match id % 7 {
                0 => HealthStatus::Degraded,
                1 => HealthStatus::Unavailable,
                _ => HealthStatus::Healthy,
            };
            let reading = ProviderHealth {
                status,
                recent_request_count: (id % 600) as u32,
                ..ProviderHealth::default()
            };
            (format!("provider-{}", id), reading)
        })
        .collect();
    (snapshot, health)
}

fn bench_strategies(c: &mut Criterion) {
    let policies = [
        ("cost_optimized", RoutingPolicy::cost_optimized(Some(0.02))),
        ("failover", RoutingPolicy::failover(true)),
        (
            "capability_based",
            RoutingPolicy::capability_based([Capability::Reasoning, Capability::CodeGeneration])
                .with_preferred([Capability::Vision]),
        ),
    ];
    let request = ChatRequest::new("Summarize the release notes");

    for (name, policy) in &policies {
        let mut group = c.benchmark_group(format!("select_candidates/{}", name));
        for count in [5usize, 25, 100] {
            let (snapshot, health) = create_fixture(count);
            group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
                b.iter(|| {
                    let decision =
                        select_candidates(black_box(&request), policy, &snapshot, &health);
                    black_box(decision)
                });
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
