//! Per-provider health state tracking.

use super::config::HealthConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::time::Instant;

/// Derived provider health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Recent calls mostly succeed
    #[default]
    Healthy,
    /// Recent calls fail often, or a half-open probe is due
    Degraded,
    /// Circuit open; excluded from routing until the cooldown elapses
    Unavailable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Outcome {
    at: Instant,
    success: bool,
}

/// Rolling health and quota state for a single provider.
#[derive(Debug, Clone, Default)]
pub struct HealthRecord {
    outcomes: VecDeque<Outcome>,
    /// Dispatch timestamps inside the rate window
    requests: VecDeque<Instant>,
    consecutive_failures: u32,
    status: HealthStatus,
    /// Set while the circuit is open
    opened_at: Option<Instant>,
    last_latency_ms: Option<u64>,
    last_outcome_at: Option<DateTime<Utc>>,
}

/// Counts over the outcomes still inside the time window.
#[derive(Debug, Clone, Copy, Default)]
struct WindowCounts {
    total: usize,
    successes: usize,
    /// Failure streak, limited to the failures still inside the window
    consecutive_failures: u32,
}

impl WindowCounts {
    fn success_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.successes as f64 / self.total as f64)
    }
}

impl HealthRecord {
    /// Apply a call outcome. Returns `Some((old, new))` when the stored
    /// status changed.
    pub fn record(
        &mut self,
        success: bool,
        latency_ms: u64,
        now: Instant,
        config: &HealthConfig,
    ) -> Option<(HealthStatus, HealthStatus)> {
        let old = self.status;

        self.prune_outcomes(now, config);
        self.outcomes.push_back(Outcome { at: now, success });
        while self.outcomes.len() > config.window_size.max(1) {
            self.outcomes.pop_front();
        }
        self.last_latency_ms = Some(latency_ms);
        self.last_outcome_at = Some(Utc::now());

        if success {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
        }

        if self.opened_at.is_some() {
            if success {
                // Probe succeeded: close the circuit and start a fresh window.
                self.opened_at = None;
                self.outcomes.clear();
                self.outcomes.push_back(Outcome { at: now, success });
                self.status = HealthStatus::Healthy;
            } else {
                self.opened_at = Some(now);
                self.status = HealthStatus::Unavailable;
            }
        } else {
            let counts = self.window_counts(now, config);
            self.consecutive_failures = counts.consecutive_failures;
            self.status = compute_status(&counts, config);
            if self.status == HealthStatus::Unavailable {
                self.opened_at = Some(now);
            }
        }

        (old != self.status).then_some((old, self.status))
    }

    fn window_counts(&self, now: Instant, config: &HealthConfig) -> WindowCounts {
        let window = config.window();
        let live: Vec<&Outcome> = self
            .outcomes
            .iter()
            .filter(|o| now.saturating_duration_since(o.at) < window)
            .collect();
        let trailing_failures = live.iter().rev().take_while(|o| !o.success).count() as u32;
        WindowCounts {
            total: live.len(),
            successes: live.iter().filter(|o| o.success).count(),
            consecutive_failures: self.consecutive_failures.min(trailing_failures),
        }
    }

    /// Status as seen by routing at `now`.
    ///
    /// A closed circuit is re-derived from the outcomes still inside the
    /// window, so a provider with no recent outcomes reads `Healthy`. An open
    /// circuit whose cooldown has elapsed reports `Degraded` so the provider
    /// gets a half-open probe.
    pub fn effective_status(&self, now: Instant, config: &HealthConfig) -> HealthStatus {
        match self.opened_at {
            Some(_) if self.probe_due(now, config) => HealthStatus::Degraded,
            Some(_) => HealthStatus::Unavailable,
            None => compute_status(&self.window_counts(now, config), config),
        }
    }

    fn probe_due(&self, now: Instant, config: &HealthConfig) -> bool {
        self.opened_at
            .is_some_and(|opened| now.saturating_duration_since(opened) >= config.cooldown())
    }

    /// Fraction of successful outcomes inside the window at `now`.
    pub fn success_rate(&self, now: Instant, config: &HealthConfig) -> Option<f64> {
        self.window_counts(now, config).success_rate()
    }

    /// Requests dispatched within the trailing rate window.
    pub fn recent_request_count(&self, now: Instant, config: &HealthConfig) -> u32 {
        let window = config.rate_window();
        self.requests
            .iter()
            .filter(|&&at| now.saturating_duration_since(at) < window)
            .count() as u32
    }

    /// Count a request against the quota if one is free.
    ///
    /// The check and the increment happen under the same borrow, so callers
    /// holding the record lock cannot race each other past the limit.
    pub fn try_acquire(&mut self, now: Instant, limit: u32, config: &HealthConfig) -> bool {
        let window = config.rate_window();
        while let Some(&front) = self.requests.front() {
            if now.saturating_duration_since(front) >= window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
        if (self.requests.len() as u32) < limit {
            self.requests.push_back(now);
            true
        } else {
            false
        }
    }

    fn prune_outcomes(&mut self, now: Instant, config: &HealthConfig) {
        let window = config.window();
        while let Some(front) = self.outcomes.front() {
            if now.saturating_duration_since(front.at) >= window {
                self.outcomes.pop_front();
            } else {
                break;
            }
        }
    }

    /// Read-only view of this record at `now`.
    pub fn view(&self, now: Instant, config: &HealthConfig) -> ProviderHealth {
        let counts = self.window_counts(now, config);
        let status = match self.opened_at {
            Some(_) => self.effective_status(now, config),
            None => compute_status(&counts, config),
        };
        ProviderHealth {
            status,
            probe_due: self.probe_due(now, config),
            recent_request_count: self.recent_request_count(now, config),
            last_latency_ms: self.last_latency_ms,
            consecutive_failures: counts.consecutive_failures,
            success_rate: counts.success_rate(),
            last_outcome_at: self.last_outcome_at,
        }
    }
}

fn compute_status(counts: &WindowCounts, config: &HealthConfig) -> HealthStatus {
    if counts.consecutive_failures >= config.failure_threshold {
        return HealthStatus::Unavailable;
    }
    if counts.total >= config.min_samples {
        if let Some(rate) = counts.success_rate() {
            return if rate >= config.healthy_threshold {
                HealthStatus::Healthy
            } else if rate >= config.unavailable_threshold {
                HealthStatus::Degraded
            } else {
                HealthStatus::Unavailable
            };
        }
    }
    if counts.consecutive_failures > 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Operational health status of one provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub status: HealthStatus,
    /// Circuit is open but its cooldown elapsed; the next call is a probe
    pub probe_due: bool,
    pub recent_request_count: u32,
    pub last_latency_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub success_rate: Option<f64>,
    pub last_outcome_at: Option<DateTime<Utc>>,
}

impl ProviderHealth {
    /// Whether another request fits under `max_requests_per_minute`.
    pub fn within_rate_limit(&self, max_requests_per_minute: u32) -> bool {
        self.recent_request_count < max_requests_per_minute
    }
}
