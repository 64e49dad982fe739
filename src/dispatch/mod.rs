//! Dispatch Executor
//!
//! Walks a [`RoutingDecision`] in order, calling each candidate until one
//! succeeds. Every attempt claims a rate-limit slot first and records its
//! outcome with the health tracker. Failed candidates are not retried.

use crate::error::RouterError;
use crate::health::HealthTracker;
use crate::metrics::{self, CallOutcome};
use crate::provider::{ProviderClients, ProviderError, ProviderResponse};
use crate::routing::{ChatRequest, NoProviderReason, RoutingDecision, RoutingError};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// One failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFailure {
    pub provider_id: String,
    pub error: ProviderError,
}

impl CandidateFailure {
    pub fn new(provider_id: impl Into<String>, error: ProviderError) -> Self {
        Self {
            provider_id: provider_id.into(),
            error,
        }
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub request_id: Uuid,
    /// Provider that produced the response
    pub provider_id: String,
    pub response: ProviderResponse,
    /// Providers actually called, including the successful one
    pub attempts: u32,
    /// Candidates skipped because they were at their request quota
    pub rate_limited: Vec<String>,
    /// Failures before the successful attempt, in order
    pub failures: Vec<CandidateFailure>,
}

/// Executes routing decisions against attached provider clients.
pub struct Dispatcher {
    health: Arc<HealthTracker>,
    clients: Arc<ProviderClients>,
}

impl Dispatcher {
    pub fn new(health: Arc<HealthTracker>, clients: Arc<ProviderClients>) -> Self {
        Self { health, clients }
    }

    /// Call the decision's candidates in order until one succeeds.
    ///
    /// # Errors
    ///
    /// - `RouterError::Cancelled` if `cancel` fires; the in-flight call is
    ///   dropped and no health outcome is recorded for it.
    /// - `RouterError::NoProviderAvailable` with `RateLimited` when every
    ///   candidate was at its quota and nothing was attempted.
    /// - `RouterError::AllProvidersFailed` with one entry per attempted
    ///   candidate, in attempt order.
    pub async fn execute(
        &self,
        request: &ChatRequest,
        decision: &RoutingDecision,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, RouterError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            strategy = %decision.strategy,
            generation = decision.generation,
        );
        self.run(request_id, request, decision, cancel)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        request_id: Uuid,
        request: &ChatRequest,
        decision: &RoutingDecision,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, RouterError> {
        let mut failures: Vec<CandidateFailure> = Vec::new();
        let mut rate_limited: Vec<String> = Vec::new();
        let mut attempts = 0u32;

        for provider in &decision.candidates {
            if cancel.is_cancelled() {
                tracing::debug!("Request cancelled before next candidate");
                return Err(RouterError::Cancelled);
            }

            let Some(client) = self.clients.get(&provider.id) else {
                tracing::warn!(provider_id = %provider.id, "No client attached, skipping candidate");
                failures.push(CandidateFailure::new(
                    provider.id.as_str(),
                    ProviderError::not_configured(&provider.id),
                ));
                continue;
            };

            if !self
                .health
                .try_acquire(&provider.id, provider.max_requests_per_minute)
            {
                tracing::debug!(
                    provider_id = %provider.id,
                    max_requests_per_minute = provider.max_requests_per_minute,
                    "Candidate at request quota, skipping"
                );
                metrics::record_rate_limited(&provider.id);
                rate_limited.push(provider.id.clone());
                continue;
            }

            if attempts > 0 {
                metrics::record_failover();
            }
            attempts += 1;

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(provider_id = %provider.id, "Request cancelled during provider call");
                    metrics::record_call(&provider.id, CallOutcome::Cancelled, started.elapsed());
                    return Err(RouterError::Cancelled);
                }
                result = tokio::time::timeout(provider.timeout, client.call(request)) => result,
            };
            let elapsed = started.elapsed();
            let latency_ms = elapsed.as_millis() as u64;

            let error = match result {
                Ok(Ok(response)) => {
                    self.health.record_outcome(&provider.id, true, latency_ms);
                    metrics::record_call(&provider.id, CallOutcome::Success, elapsed);
                    tracing::info!(
                        provider_id = %provider.id,
                        latency_ms,
                        tokens_used = response.tokens_used,
                        attempts,
                        "Provider call succeeded"
                    );
                    return Ok(DispatchOutcome {
                        request_id,
                        provider_id: provider.id.clone(),
                        response,
                        attempts,
                        rate_limited,
                        failures,
                    });
                }
                Ok(Err(error)) => {
                    metrics::record_call(&provider.id, CallOutcome::Error, elapsed);
                    error
                }
                Err(_) => {
                    metrics::record_call(&provider.id, CallOutcome::Timeout, elapsed);
                    ProviderError::timeout(provider.timeout.as_millis() as u64)
                }
            };

            self.health.record_outcome(&provider.id, false, latency_ms);
            tracing::warn!(
                provider_id = %provider.id,
                error_kind = %error.kind,
                error = %error.message,
                latency_ms,
                "Provider call failed, advancing to next candidate"
            );
            failures.push(CandidateFailure::new(provider.id.as_str(), error));
        }

        if failures.is_empty() {
            let reason = if rate_limited.is_empty() {
                NoProviderReason::NoneConfigured
            } else {
                NoProviderReason::RateLimited
            };
            metrics::record_no_provider(reason.as_tag());
            tracing::warn!(%reason, "No candidate could be attempted");
            return Err(RoutingError::NoProviderAvailable {
                strategy: decision.strategy,
                reason,
            }
            .into());
        }

        tracing::error!(
            failures = failures.len(),
            rate_limited = rate_limited.len(),
            "All attempted providers failed"
        );
        Err(RouterError::AllProvidersFailed { failures })
    }
}

#[cfg(test)]
mod tests;
