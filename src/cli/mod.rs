//! CLI module for the model router
//!
//! Operator commands for inspecting configuration and previewing routing
//! decisions. None of them call a provider.
//!
//! # Commands
//!
//! - `providers` - List configured providers
//! - `validate` - Validate a configuration file, reporting every problem
//! - `route` - Show the candidate list a request would get (dry run)
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Which providers would serve a reasoning + code request?
//! model-router route --strategy capability_based --require reasoning --require code_generation
//!
//! # Generate shell completions
//! model-router completions bash > ~/.bash_completion.d/model-router
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod providers;
pub mod route;
pub mod validate;

pub use completions::handle_completions;
pub use config::handle_config_init;
pub use providers::handle_providers;
pub use route::handle_route;
pub use validate::handle_validate;

use crate::config::{ConfigError, RouterConfig};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "router.toml";

/// Model Router - policy-driven LLM provider selection
#[derive(Parser, Debug)]
#[command(
    name = "model-router",
    version,
    about = "Policy-driven routing across LLM providers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured providers
    Providers(ProvidersArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// Preview the routing decision for a request
    Route(RouteArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only providers with this capability
    #[arg(long)]
    pub capability: Option<String>,

    /// Hide disabled providers
    #[arg(long)]
    pub enabled_only: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "ROUTER_CONFIG")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "ROUTER_CONFIG")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Routing strategy (cost_optimized, failover, capability_based);
    /// defaults to the configured default policy
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Cost ceiling for cost_optimized
    #[arg(long)]
    pub max_cost: Option<f64>,

    /// Fail instead of relaxing the cost ceiling
    #[arg(long)]
    pub strict: bool,

    /// Required capability (repeatable)
    #[arg(long = "require")]
    pub require: Vec<String>,

    /// Preferred capability (repeatable)
    #[arg(long = "prefer")]
    pub prefer: Vec<String>,

    /// Don't fall back to degraded providers under failover
    #[arg(long)]
    pub no_fallback: bool,

    /// Requested model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "ROUTER_CONFIG")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,

    /// Default routing strategy for the generated file
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Generate a skeleton entry for this provider id instead of the
    /// example providers (repeatable)
    #[arg(short, long = "provider")]
    pub providers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load a configuration file with environment overrides applied.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    Ok(RouterConfig::load(Some(path))?.with_env_overrides())
}
