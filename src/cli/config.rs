//! `config init`: write a starter configuration file.
//!
//! Without options the annotated example is written as is. With
//! `--strategy` or `--provider` a file is generated from the example's
//! settings. Either way the result must load and validate before anything
//! touches the disk.

use crate::cli::ConfigInitArgs;
use crate::config::{load_from_config, ProviderConfig, RouterConfig};
use crate::registry::Capability;
use crate::routing::RoutingStrategy;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../router.example.toml");

/// Handle `model-router config init`
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<String, Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    let content = render_config(args)?;
    let loaded = load_from_config(&RouterConfig::from_toml_str(&content)?)?;
    fs::write(&args.output, &content)?;

    tracing::debug!(path = %args.output.display(), "Configuration file written");
    Ok(format!(
        "✓ Configuration file created: {} ({} provider(s), default strategy {})\n  \
         Edit the [[providers]] entries to match your deployment.",
        args.output.display(),
        loaded.snapshot.len(),
        loaded.default_policy.strategy
    ))
}

/// Contents of the starter file for `args`.
pub fn render_config(args: &ConfigInitArgs) -> Result<String, Box<dyn std::error::Error>> {
    if args.strategy.is_none() && args.providers.is_empty() {
        return Ok(EXAMPLE_CONFIG.to_string());
    }

    let mut config = RouterConfig::from_toml_str(EXAMPLE_CONFIG)?;
    if let Some(strategy) = &args.strategy {
        config.router.default_policy.strategy = strategy.parse::<RoutingStrategy>()?.to_string();
    }
    if !args.providers.is_empty() {
        config.providers = args
            .providers
            .iter()
            .map(|id| {
                let mut provider = ProviderConfig::new(id.trim());
                provider.capabilities = vec![Capability::TextGeneration.as_str().to_string()];
                provider
            })
            .collect();
    }

    Ok(format!(
        "# Model Router configuration, generated by `model-router config init`\n\n{}",
        toml::to_string_pretty(&config)?
    ))
}
