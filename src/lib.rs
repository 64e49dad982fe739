//! Model Router - policy-driven selection across LLM providers
//!
//! This library selects among multiple LLM providers according to a routing
//! policy, tracks per-provider health and request quotas, dispatches chat
//! requests with failover, and supports reconfiguration at runtime without
//! disturbing requests in flight.
//!
//! # Example
//!
//! ```
//! use model_router::registry::{Capability, ProviderDescriptor};
//! use model_router::routing::{ChatRequest, RoutingPolicy};
//! use model_router::ModelRouter;
//!
//! let router = ModelRouter::new(RoutingPolicy::failover(true));
//! router.register_provider(
//!     ProviderDescriptor::new("grok")
//!         .with_capabilities([Capability::TextGeneration, Capability::Reasoning])
//!         .with_priority(1),
//! );
//! router.register_provider(ProviderDescriptor::new("local").with_priority(10));
//!
//! let decision = router.decide(&ChatRequest::new("hello")).unwrap();
//! assert_eq!(decision.provider_ids(), vec!["grok", "local"]);
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod registry;
pub mod router;
pub mod routing;

pub use error::RouterError;
pub use router::{ModelRouter, ProviderStatus, ReloadSummary, StatusReport};
