use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A capability an LLM provider can offer.
///
/// Capabilities drive `capability_based` routing: a provider is only a
/// candidate when its capability set covers every required capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Plain chat / text completion
    TextGeneration,
    /// Multi-step reasoning
    Reasoning,
    /// Source code generation
    CodeGeneration,
    /// Image inputs
    Vision,
    /// Tool / function calling
    FunctionCalling,
    /// Embedding vectors
    Embeddings,
}

impl Capability {
    /// All known capability tags, in declaration order.
    pub const ALL: [Capability; 6] = [
        Capability::TextGeneration,
        Capability::Reasoning,
        Capability::CodeGeneration,
        Capability::Vision,
        Capability::FunctionCalling,
        Capability::Embeddings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::TextGeneration => "text_generation",
            Capability::Reasoning => "reasoning",
            Capability::CodeGeneration => "code_generation",
            Capability::Vision => "vision",
            Capability::FunctionCalling => "function_calling",
            Capability::Embeddings => "embeddings",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Capability::ALL
            .iter()
            .find(|c| c.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An LLM provider as the router sees it.
///
/// Descriptors are immutable once published in a registry snapshot. A
/// reconfiguration replaces the whole descriptor, so a routing decision that
/// holds an `Arc<ProviderDescriptor>` keeps seeing the values it was made with.
///
/// # Examples
///
/// ```
/// use model_router::registry::{Capability, ProviderDescriptor};
///
/// let grok = ProviderDescriptor::new("grok")
///     .with_capabilities([Capability::TextGeneration, Capability::Reasoning])
///     .with_cost(0.02)
///     .with_priority(1)
///     .with_rate_limit(120);
///
/// assert!(grok.supports(Capability::Reasoning));
/// assert!(!grok.supports(Capability::Vision));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique identifier (e.g. "grok", "local-llama")
    pub id: String,
    /// Capabilities offered by this provider
    pub capabilities: BTreeSet<Capability>,
    /// Cost per unit (per 1K tokens by convention)
    pub cost_per_unit: f64,
    /// Priority for routing (lower = prefer)
    pub priority: i32,
    /// Sliding-window request quota
    pub max_requests_per_minute: u32,
    /// Disabled providers are never routed to
    pub enabled: bool,
    /// Per-call timeout
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Models served by this provider; empty means any model
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderDescriptor {
    /// Default per-call timeout when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create an enabled descriptor with no capabilities, zero cost and a
    /// 60 requests/minute quota.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: BTreeSet::new(),
            cost_per_unit: 0.0,
            priority: 0,
            max_requests_per_minute: 60,
            enabled: true,
            timeout: Self::DEFAULT_TIMEOUT,
            models: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    pub fn with_cost(mut self, cost_per_unit: f64) -> Self {
        self.cost_per_unit = cost_per_unit;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_rate_limit(mut self, max_requests_per_minute: u32) -> Self {
        self.max_requests_per_minute = max_requests_per_minute;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_models(mut self, models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this provider offers the given capability.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether this provider can serve the named model.
    ///
    /// A provider that lists no models accepts any model name.
    pub fn serves_model(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.iter().any(|m| m == model)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
