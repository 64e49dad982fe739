//! Validate command implementation

use crate::cli::output::format_issues;
use crate::cli::{load_config, ValidateArgs};
use crate::config::{load_from_config, ConfigError};

/// Handle `model-router validate`
///
/// Every problem in the file is listed, not just the first one.
pub fn handle_validate(args: &ValidateArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    match load_from_config(&config) {
        Ok(loaded) => {
            let enabled = loaded.snapshot.iter().filter(|p| p.enabled).count();
            Ok(format!(
                "✓ {} is valid: {} provider(s), {} enabled, default strategy {}",
                args.config.display(),
                loaded.snapshot.len(),
                enabled,
                loaded.default_policy.strategy
            ))
        }
        Err(ConfigError::Invalid(issues)) => Err(format!(
            "{} has {} problem(s):\n{}",
            args.config.display(),
            issues.len(),
            format_issues(&issues)
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}
