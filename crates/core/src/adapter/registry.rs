//! Lookup table of configured source adapters.

use std::collections::HashMap;
use std::sync::Arc;

use super::SourceAdapter;

/// Source adapters by name, in registration order.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    order: Vec<String>,
    adapters: HashMap<String, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Every registered adapter, in registration order.
    pub fn all(&self) -> Vec<Arc<dyn SourceAdapter>> {
        self.order
            .iter()
            .filter_map(|name| self.adapters.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.order)
            .finish()
    }
}
