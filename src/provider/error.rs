//! Error types for provider calls.

use serde::Serialize;
use thiserror::Error;

/// Category of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Call exceeded the provider's deadline
    Timeout,
    /// Connection-level failure (DNS, refused, reset)
    Network,
    /// Provider answered with an error status
    Rejected,
    /// Response could not be interpreted
    MalformedResponse,
    /// No client is attached for the provider
    NotConfigured,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::Rejected => "rejected",
            ProviderErrorKind::MalformedResponse => "malformed_response",
            ProviderErrorKind::NotConfigured => "not_configured",
        };
        f.write_str(s)
    }
}

/// A single provider call failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after_ms: u64) -> Self {
        Self::new(
            ProviderErrorKind::Timeout,
            format!("request timeout after {}ms", after_ms),
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Rejected, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::MalformedResponse, message)
    }

    pub fn not_configured(provider_id: &str) -> Self {
        Self::new(
            ProviderErrorKind::NotConfigured,
            format!("no client attached for provider '{}'", provider_id),
        )
    }
}
