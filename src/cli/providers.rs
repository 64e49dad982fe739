//! Providers command implementation

use crate::cli::output::{format_providers_json, format_providers_table, ProviderView};
use crate::cli::{load_config, ProvidersArgs};
use crate::registry::Capability;
use crate::router::ModelRouter;

/// Handle `model-router providers`
pub fn handle_providers(args: &ProvidersArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let router = ModelRouter::from_config(&config)?;
    list_providers(args, &router)
}

/// List the router's providers, applying the command's filters.
pub fn list_providers(
    args: &ProvidersArgs,
    router: &ModelRouter,
) -> Result<String, Box<dyn std::error::Error>> {
    let capability = args
        .capability
        .as_deref()
        .map(str::parse::<Capability>)
        .transpose()?;

    let views: Vec<ProviderView> = router
        .status_report()
        .providers
        .iter()
        .filter(|p| !args.enabled_only || p.enabled)
        .filter(|p| capability.map_or(true, |c| p.capabilities.contains(&c)))
        .map(ProviderView::from)
        .collect();

    if args.json {
        Ok(format_providers_json(&views)?)
    } else {
        Ok(format_providers_table(&views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderDescriptor;
    use std::path::PathBuf;

    fn args() -> ProvidersArgs {
        ProvidersArgs {
            json: true,
            capability: None,
            enabled_only: false,
            config: PathBuf::from("unused.toml"),
        }
    }

    fn router() -> ModelRouter {
        let router = ModelRouter::default();
        router.register_provider(
            ProviderDescriptor::new("grok").with_capabilities([Capability::Reasoning]),
        );
        router.register_provider(
            ProviderDescriptor::new("local")
                .with_capabilities([Capability::TextGeneration])
                .disabled(),
        );
        router
    }

    fn ids(output: &str) -> Vec<String> {
        let parsed: serde_json::Value = serde_json::from_str(output).unwrap();
        parsed["providers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_list_all() {
        let output = list_providers(&args(), &router()).unwrap();
        assert_eq!(ids(&output), vec!["grok", "local"]);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let enabled = ProvidersArgs {
            enabled_only: true,
            ..args()
        };
        assert_eq!(ids(&list_providers(&enabled, &router()).unwrap()), vec!["grok"]);

        let text = ProvidersArgs {
            capability: Some("text-generation".to_string()),
            ..args()
        };
        assert_eq!(ids(&list_providers(&text, &router()).unwrap()), vec!["local"]);
    }

    #[tokio::test]
    async fn test_unknown_capability_is_error() {
        let bad = ProvidersArgs {
            capability: Some("telepathy".to_string()),
            ..args()
        };
        assert!(list_providers(&bad, &router()).is_err());
    }
}
