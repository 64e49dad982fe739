//! Provider Registry module.
//!
//! Holds the configured LLM providers as an immutable snapshot behind an
//! atomically swappable pointer. Readers load the snapshot once and keep it
//! for the lifetime of a routing decision; writers publish a new snapshot.

mod error;
mod provider;

pub use error::*;
pub use provider::*;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable, point-in-time view of the registered providers.
///
/// Providers keep their insertion order. Every snapshot published by a
/// [`Registry`] carries a generation number one higher than its predecessor.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    providers: Vec<Arc<ProviderDescriptor>>,
    index: HashMap<String, usize>,
    generation: u64,
}

impl RegistrySnapshot {
    /// Build a snapshot from descriptors, rejecting duplicate identifiers.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ProviderDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut snapshot = Self::default();
        for descriptor in descriptors {
            if snapshot.index.contains_key(&descriptor.id) {
                return Err(RegistryError::DuplicateProvider(descriptor.id));
            }
            snapshot
                .index
                .insert(descriptor.id.clone(), snapshot.providers.len());
            snapshot.providers.push(Arc::new(descriptor));
        }
        Ok(snapshot)
    }

    /// Generation of this snapshot (0 for a snapshot never published).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up a provider by identifier.
    pub fn get(&self, id: &str) -> Option<&Arc<ProviderDescriptor>> {
        self.index.get(id).map(|&i| &self.providers[i])
    }

    /// Providers in insertion order, optionally restricted to a capability
    /// and/or to enabled providers.
    pub fn list(
        &self,
        capability: Option<Capability>,
        enabled_only: bool,
    ) -> Vec<Arc<ProviderDescriptor>> {
        self.providers
            .iter()
            .filter(|p| !enabled_only || p.enabled)
            .filter(|p| capability.is_none_or(|c| p.supports(c)))
            .cloned()
            .collect()
    }

    /// All providers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProviderDescriptor>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Copy of this snapshot with `descriptor` inserted or replaced in place.
    fn with_upsert(&self, descriptor: ProviderDescriptor) -> (Self, Option<Arc<ProviderDescriptor>>) {
        let mut next = self.clone();
        let descriptor = Arc::new(descriptor);
        let previous = match next.index.get(&descriptor.id) {
            Some(&i) => Some(std::mem::replace(&mut next.providers[i], descriptor)),
            None => {
                next.index.insert(descriptor.id.clone(), next.providers.len());
                next.providers.push(descriptor);
                None
            }
        };
        (next, previous)
    }

    fn without(&self, id: &str) -> Option<(Self, Arc<ProviderDescriptor>)> {
        let position = *self.index.get(id)?;
        let mut providers = self.providers.clone();
        let removed = providers.remove(position);
        let index = providers
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Some((
            Self {
                providers,
                index,
                generation: self.generation,
            },
            removed,
        ))
    }
}

/// The Provider Registry.
///
/// Reads are lock-free (`ArcSwap::load_full`); writes are serialized by a
/// mutex and publish a fresh copy-on-write snapshot, so a reader never sees a
/// partially applied change.
///
/// # Examples
///
/// ```
/// use model_router::registry::{Capability, ProviderDescriptor, Registry};
///
/// let registry = Registry::new();
/// registry.register(ProviderDescriptor::new("grok").with_capabilities([Capability::Reasoning]));
/// registry.register(ProviderDescriptor::new("local"));
///
/// let reasoning = registry.list(Some(Capability::Reasoning), true);
/// assert_eq!(reasoning.len(), 1);
/// assert_eq!(reasoning[0].id, "grok");
/// ```
pub struct Registry {
    current: ArcSwap<RegistrySnapshot>,
    write_lock: Mutex<()>,
}

impl Registry {
    /// Create a new empty Registry.
    pub fn new() -> Self {
        Self::from_snapshot(RegistrySnapshot::default())
    }

    /// Create a registry publishing `snapshot` as generation 1.
    pub fn from_snapshot(mut snapshot: RegistrySnapshot) -> Self {
        snapshot.generation = 1;
        Self {
            current: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    /// Add or replace a provider by identifier.
    ///
    /// Replacing keeps the provider's original list position. Returns the
    /// previous descriptor if one was replaced.
    pub fn register(&self, descriptor: ProviderDescriptor) -> Option<Arc<ProviderDescriptor>> {
        let _guard = self.write_lock.lock();
        let current = self.current.load();
        let (mut next, previous) = current.with_upsert(descriptor);
        next.generation = current.generation + 1;
        self.current.store(Arc::new(next));
        previous
    }

    /// Add a new provider to the registry.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateProvider` if a provider with the same ID already exists.
    pub fn add_provider(&self, descriptor: ProviderDescriptor) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        let current = self.current.load();
        if current.index.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateProvider(descriptor.id));
        }
        let (mut next, _) = current.with_upsert(descriptor);
        next.generation = current.generation + 1;
        self.current.store(Arc::new(next));
        Ok(())
    }

    /// Remove a provider from the registry.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ProviderNotFound` if no provider with the given ID exists.
    pub fn remove_provider(&self, id: &str) -> Result<Arc<ProviderDescriptor>, RegistryError> {
        let _guard = self.write_lock.lock();
        let current = self.current.load();
        let (mut next, removed) = current
            .without(id)
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))?;
        next.generation = current.generation + 1;
        self.current.store(Arc::new(next));
        Ok(removed)
    }

    /// Atomically publish a whole new snapshot, returning the one it replaced.
    ///
    /// Decisions already holding the old snapshot are unaffected.
    pub fn replace(&self, mut snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        let _guard = self.write_lock.lock();
        let previous = self.current.load_full();
        snapshot.generation = previous.generation + 1;
        self.current.store(Arc::new(snapshot));
        previous
    }

    /// Get a provider by ID.
    pub fn get(&self, id: &str) -> Result<Arc<ProviderDescriptor>, RegistryError> {
        self.current
            .load()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))
    }

    /// List providers in insertion order.
    pub fn list(
        &self,
        capability: Option<Capability>,
        enabled_only: bool,
    ) -> Vec<Arc<ProviderDescriptor>> {
        self.current.load().list(capability, enabled_only)
    }

    /// Get the number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.current.load().len()
    }

    /// Generation of the currently published snapshot.
    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
