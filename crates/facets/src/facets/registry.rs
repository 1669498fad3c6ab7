//! Facet registry - indexes providers by facet name.
//!
//! Providers are registered explicitly at startup; the registry is then
//! shared read-only (typically behind an `Arc`) by the search layer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::provider::FacetProvider;

/// Registry mapping facet names to providers, in registration order.
#[derive(Default)]
pub struct FacetRegistry {
    providers: Vec<Arc<dyn FacetProvider>>,
    by_name: HashMap<String, usize>,
}

impl FacetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its name.
    ///
    /// A provider already registered under the same name is replaced in
    /// place and returned.
    pub fn register_facet_provider(
        &mut self,
        provider: Arc<dyn FacetProvider>,
    ) -> Option<Arc<dyn FacetProvider>> {
        let name = provider.name().to_string();

        if let Some(&idx) = self.by_name.get(&name) {
            warn!(facet = %name, "replacing registered facet provider");
            return Some(std::mem::replace(&mut self.providers[idx], provider));
        }

        debug!(facet = %name, "registered facet provider");
        self.by_name.insert(name, self.providers.len());
        self.providers.push(provider);
        None
    }

    /// Get a provider by facet name.
    pub fn get_provider(&self, name: &str) -> Option<Arc<dyn FacetProvider>> {
        self.by_name
            .get(name)
            .map(|&idx| Arc::clone(&self.providers[idx]))
    }

    /// All providers, in registration order.
    pub fn providers(&self) -> &[Arc<dyn FacetProvider>] {
        &self.providers
    }

    /// Registered facet names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for FacetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetRegistry")
            .field("facets", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
