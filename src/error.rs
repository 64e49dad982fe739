//! Top-level error type returned by the router facade.

use crate::config::ConfigError;
use crate::dispatch::CandidateFailure;
use crate::registry::RegistryError;
use crate::routing::{NoProviderReason, RoutingError};
use thiserror::Error;

/// Errors surfaced to callers of [`crate::ModelRouter`].
#[derive(Debug, Error)]
pub enum RouterError {
    /// No candidate survived filtering, or every candidate was at its quota
    #[error(transparent)]
    NoProviderAvailable(#[from] RoutingError),

    /// Every attempted candidate failed; one entry per attempt, in order
    #[error("All {} attempted providers failed", .failures.len())]
    AllProvidersFailed { failures: Vec<CandidateFailure> },

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl RouterError {
    /// Whether retrying the same request later may succeed.
    ///
    /// Health and quota problems clear up on their own; configuration and
    /// policy mismatches do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RouterError::NoProviderAvailable(err) => err.reason().is_retryable(),
            RouterError::AllProvidersFailed { .. } => true,
            RouterError::Cancelled | RouterError::Registry(_) | RouterError::Configuration(_) => {
                false
            }
        }
    }

    /// The no-provider reason, when that is what went wrong.
    pub fn no_provider_reason(&self) -> Option<&NoProviderReason> {
        match self {
            RouterError::NoProviderAvailable(err) => Some(err.reason()),
            _ => None,
        }
    }
}
