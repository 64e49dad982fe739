//! Build registry snapshots and default policies from configuration.

use super::error::{ConfigError, ValidationIssue};
use super::provider::ProviderConfig;
use super::RouterConfig;
use crate::health::HealthConfig;
use crate::registry::RegistrySnapshot;
use crate::routing::RoutingPolicy;

/// Everything the router needs from a validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub snapshot: RegistrySnapshot,
    pub default_policy: RoutingPolicy,
    pub health: HealthConfig,
}

/// Validate `config` and build a fresh snapshot from it.
///
/// Nothing is returned unless the whole configuration is valid.
pub fn load_from_config(config: &RouterConfig) -> Result<LoadedConfig, ConfigError> {
    config.validate()?;

    let default_policy = config
        .router
        .default_policy
        .to_policy()
        .map_err(ConfigError::Invalid)?;
    let default_timeout = config.router.default_timeout();
    let descriptors = config
        .providers
        .iter()
        .map(|p| p.to_descriptor(default_timeout));
    let snapshot = RegistrySnapshot::from_descriptors(descriptors)
        .map_err(|e| ConfigError::Invalid(vec![ValidationIssue::new("providers", e.to_string())]))?;

    tracing::debug!(
        providers = snapshot.len(),
        strategy = %default_policy.strategy,
        "Configuration loaded"
    );

    Ok(LoadedConfig {
        snapshot,
        default_policy,
        health: config.health.clone(),
    })
}

/// Read configuration from the environment and load it.
///
/// See [`RouterConfig::from_environment`] for the variables consulted.
pub fn load_from_environment() -> Result<LoadedConfig, ConfigError> {
    load_from_config(&RouterConfig::from_environment()?)
}

/// Environment variable prefix for one provider, e.g. `ROUTER_PROVIDER_LOCAL_LLM_`.
pub fn provider_env_prefix(id: &str) -> String {
    let key: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("ROUTER_PROVIDER_{}_", key)
}

pub(crate) fn providers_from_env<F>(ids: &str, var: &F) -> Result<Vec<ProviderConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut providers = Vec::new();
    let mut issues = Vec::new();

    for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        let prefix = provider_env_prefix(id);
        let mut provider = ProviderConfig::new(id);

        if let Some(caps) = var(&format!("{}CAPABILITIES", prefix)) {
            provider.capabilities = split_list(&caps);
        }
        if let Some(models) = var(&format!("{}MODELS", prefix)) {
            provider.models = split_list(&models);
        }
        parse_var(var, &prefix, "COST", &mut issues, |v| provider.cost_per_unit = v);
        parse_var(var, &prefix, "PRIORITY", &mut issues, |v| provider.priority = v);
        parse_var(var, &prefix, "MAX_RPM", &mut issues, |v| {
            provider.max_requests_per_minute = v
        });
        parse_var(var, &prefix, "ENABLED", &mut issues, |v| provider.enabled = v);
        parse_var(var, &prefix, "TIMEOUT_MS", &mut issues, |v| {
            provider.timeout_ms = Some(v)
        });

        providers.push(provider);
    }

    if issues.is_empty() {
        Ok(providers)
    } else {
        Err(ConfigError::Invalid(issues))
    }
}

fn parse_var<F, T>(
    var: &F,
    prefix: &str,
    suffix: &str,
    issues: &mut Vec<ValidationIssue>,
    apply: impl FnOnce(T),
) where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let key = format!("{}{}", prefix, suffix);
    if let Some(raw) = var(&key) {
        match raw.trim().parse::<T>() {
            Ok(value) => apply(value),
            Err(_) => issues.push(ValidationIssue::new(
                key,
                format!("cannot parse '{}'", raw),
            )),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
