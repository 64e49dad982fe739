//! Configuration for health and rate tracking.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds and windows for provider health tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Maximum number of outcomes kept per provider
    pub window_size: usize,
    /// Outcomes older than this are dropped from the window
    pub window_seconds: u64,
    /// Outcomes needed before the success rate drives status
    pub min_samples: usize,
    /// Success rate at or above which a provider is healthy
    pub healthy_threshold: f64,
    /// Success rate below which a provider is unavailable
    pub unavailable_threshold: f64,
    /// Consecutive failures before marking unavailable
    pub failure_threshold: u32,
    /// Seconds an unavailable provider waits before a half-open probe
    pub cooldown_seconds: u64,
    /// Length of the sliding rate-limit window
    pub rate_window_seconds: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            window_seconds: 300,
            min_samples: 5,
            healthy_threshold: 0.8,
            unavailable_threshold: 0.5,
            failure_threshold: 3,
            cooldown_seconds: 30,
            rate_window_seconds: 60,
        }
    }
}

impl HealthConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_seconds)
    }

    /// Check thresholds for consistency, returning one message per problem.
    pub fn problems(&self) -> Vec<(String, String)> {
        let mut problems = Vec::new();
        if self.window_size == 0 {
            problems.push(("health.window_size".into(), "must be at least 1".into()));
        }
        if self.min_samples > self.window_size {
            problems.push((
                "health.min_samples".into(),
                format!("cannot exceed window_size ({})", self.window_size),
            ));
        }
        if !(0.0..=1.0).contains(&self.healthy_threshold)
            || !(0.0..=1.0).contains(&self.unavailable_threshold)
        {
            problems.push((
                "health.thresholds".into(),
                "thresholds must be within 0.0..=1.0".into(),
            ));
        } else if self.unavailable_threshold > self.healthy_threshold {
            problems.push((
                "health.unavailable_threshold".into(),
                "must not exceed healthy_threshold".into(),
            ));
        }
        if self.failure_threshold == 0 {
            problems.push(("health.failure_threshold".into(), "must be at least 1".into()));
        }
        if self.rate_window_seconds == 0 {
            problems.push(("health.rate_window_seconds".into(), "must be non-zero".into()));
        }
        problems
    }
}
