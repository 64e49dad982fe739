//! Configuration for the model router
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ROUTER_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use model_router::config::RouterConfig;
//!
//! let toml = r#"
//! [router.default_policy]
//! strategy = "cost_optimized"
//! max_cost = 0.05
//!
//! [[providers]]
//! id = "grok"
//! capabilities = ["text_generation", "reasoning"]
//! cost_per_unit = 0.02
//! "#;
//! let config = RouterConfig::from_toml_str(toml).unwrap();
//! assert_eq!(config.providers.len(), 1);
//! assert!(config.validate().is_ok());
//! ```

pub mod error;
pub mod loader;
pub mod logging;
pub mod provider;
pub mod routing;

pub use error::{ConfigError, ValidationIssue};
pub use loader::{load_from_config, load_from_environment, LoadedConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use provider::ProviderConfig;
pub use routing::{PolicyConfig, RouterSection};

pub use crate::health::HealthConfig;

use crate::routing::RoutingStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Path of a TOML file to load instead of building from variables
pub const CONFIG_PATH_ENV: &str = "ROUTER_CONFIG";
/// Comma-separated provider ids, each described by `ROUTER_PROVIDER_<ID>_*`
pub const PROVIDERS_ENV: &str = "ROUTER_PROVIDERS";

/// Unified router configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Router-wide defaults
    pub router: RouterSection,
    /// Health window and circuit thresholds
    pub health: HealthConfig,
    /// Provider definitions
    pub providers: Vec<ProviderConfig>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl RouterConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                Self::from_toml_str(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Build configuration from the process environment.
    ///
    /// `ROUTER_CONFIG` names a file to load; otherwise providers come from
    /// `ROUTER_PROVIDERS` and `ROUTER_PROVIDER_<ID>_*`. Overrides from
    /// [`RouterConfig::with_env_overrides`] are applied on top.
    pub fn from_environment() -> Result<Self, ConfigError> {
        Self::from_env_source(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_env_source<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = if let Some(path) = var(CONFIG_PATH_ENV) {
            Self::load(Some(Path::new(&path)))?
        } else if let Some(ids) = var(PROVIDERS_ENV) {
            Self {
                providers: loader::providers_from_env(&ids, &var)?,
                ..Self::default()
            }
        } else {
            Self::default()
        };
        Ok(base.apply_env(&var))
    }

    /// Apply environment variable overrides
    ///
    /// Supports `ROUTER_LOG_LEVEL`, `ROUTER_LOG_FORMAT`,
    /// `ROUTER_DEFAULT_STRATEGY` and `ROUTER_DEFAULT_TIMEOUT_MS`.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(self) -> Self {
        self.apply_env(&|key: &str| std::env::var(key).ok())
    }

    fn apply_env<F>(mut self, var: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Logging settings
        if let Some(level) = var("ROUTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ROUTER_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        // Routing defaults
        if let Some(strategy) = var("ROUTER_DEFAULT_STRATEGY") {
            if let Ok(s) = strategy.parse::<RoutingStrategy>() {
                self.router.default_policy.strategy = s.to_string();
            }
        }
        if let Some(timeout) = var("ROUTER_DEFAULT_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                if ms > 0 {
                    self.router.default_timeout_ms = ms;
                }
            }
        }

        self
    }

    /// Validate configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = self.router.problems();

        issues.extend(
            self.health
                .problems()
                .into_iter()
                .map(|(field, message)| ValidationIssue::new(field, message)),
        );

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            issues.extend(provider.problems(i));
            let id = provider.id.trim();
            if !id.is_empty() && !seen.insert(id) {
                issues.push(ValidationIssue::new(
                    format!("providers[{}].id", i),
                    format!("duplicate provider id '{}'", id),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}
