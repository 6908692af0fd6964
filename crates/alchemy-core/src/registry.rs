//! Node type registry
//!
//! Catalog of node type descriptors keyed by type name. Built-in types live
//! for the lifetime of the registry; dynamic types (synthesized from source
//! during a compile) live until the next [`NodeRegistry::clear_dynamic`].
//!
//! The registry is owned by whoever drives compiles and is passed by
//! reference into the synthesizer and resolver, so two compiles can never
//! interleave their clear and resolve steps.

use std::collections::HashMap;
use std::sync::Arc;

use crate::builtins;
use crate::capability::{NodeCapability, RendererCapability};
use crate::node::NodeDefinition;

/// Category forced onto every dynamically registered type
pub const DYNAMIC_CATEGORY: &str = "dynamic";

#[derive(Debug, Clone)]
struct Entry {
    definition: NodeDefinition,
    capability: Arc<dyn NodeCapability>,
}

/// Catalog of node types and their rendering capabilities
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    entries: HashMap<String, Entry>,
    /// Insertion order of type keys; overwriting keeps the original slot
    order: Vec<String>,
    /// Types registered dynamically in the current generation, in order
    dynamic: Vec<String>,
    /// Static entries hidden by a dynamic registration of the same key
    shadowed: HashMap<String, Entry>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl NodeRegistry {
    /// Create a registry with no types at all
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            dynamic: Vec::new(),
            shadowed: HashMap::new(),
        }
    }

    /// Create a registry seeded with the built-in node types
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for definition in builtins::definitions() {
            registry.register_builtin(definition);
        }
        registry
    }

    /// Register (or overwrite) a static type.
    ///
    /// A static registration replaces any dynamic registration of the same
    /// key and is not evicted by [`clear_dynamic`](Self::clear_dynamic).
    pub fn register(&mut self, definition: NodeDefinition, capability: Arc<dyn NodeCapability>) {
        let key = definition.type_key.clone();
        self.dynamic.retain(|k| k != &key);
        self.shadowed.remove(&key);
        self.insert(
            key,
            Entry {
                definition,
                capability,
            },
        );
    }

    /// Register a static type whose renderer is named after its type key
    pub fn register_builtin(&mut self, definition: NodeDefinition) {
        let capability = Arc::new(RendererCapability::new(definition.type_key.clone()));
        self.register(definition, capability);
    }

    /// Register a type for the current compile generation.
    ///
    /// The category is forced to `dynamic` and the generic capability is used
    /// when none is given. If the key was held by a static type, that entry is
    /// set aside and comes back on the next clear.
    pub fn register_dynamic(
        &mut self,
        mut definition: NodeDefinition,
        capability: Option<Arc<dyn NodeCapability>>,
    ) {
        definition.category = DYNAMIC_CATEGORY.to_string();
        let key = definition.type_key.clone();
        let entry = Entry {
            definition,
            capability: capability.unwrap_or_else(RendererCapability::generic),
        };

        let previous = self.insert(key.clone(), entry);
        if !self.dynamic.contains(&key) {
            if let Some(previous) = previous {
                tracing::debug!("Dynamic type '{}' shadows a static type", key);
                self.shadowed.insert(key.clone(), previous);
            }
            self.dynamic.push(key);
        }
    }

    /// Evict every dynamic type and restore any static types they shadowed.
    ///
    /// Returns the number of dynamic types evicted.
    pub fn clear_dynamic(&mut self) -> usize {
        let evicted = std::mem::take(&mut self.dynamic);
        for key in &evicted {
            match self.shadowed.remove(key) {
                Some(entry) => {
                    self.entries.insert(key.clone(), entry);
                }
                None => {
                    self.entries.remove(key);
                    self.order.retain(|k| k != key);
                }
            }
        }
        if !evicted.is_empty() {
            tracing::debug!("Cleared {} dynamic node types", evicted.len());
        }
        evicted.len()
    }

    /// Get a type's descriptor
    pub fn get(&self, type_key: &str) -> Option<&NodeDefinition> {
        self.entries.get(type_key).map(|e| &e.definition)
    }

    /// Whether a type is registered
    pub fn has(&self, type_key: &str) -> bool {
        self.entries.contains_key(type_key)
    }

    /// All descriptors in registration order
    pub fn all(&self) -> Vec<&NodeDefinition> {
        self.order
            .iter()
            .filter_map(|key| self.get(key))
            .collect()
    }

    /// Descriptors of one category, in registration order
    pub fn by_category(&self, category: &str) -> Vec<&NodeDefinition> {
        self.all()
            .into_iter()
            .filter(|def| def.category == category)
            .collect()
    }

    /// Whether a type was registered dynamically in the current generation
    pub fn is_dynamic(&self, type_key: &str) -> bool {
        self.dynamic.iter().any(|k| k == type_key)
    }

    /// Dynamic descriptors of the current generation, in registration order
    pub fn dynamic(&self) -> Vec<&NodeDefinition> {
        self.dynamic.iter().filter_map(|key| self.get(key)).collect()
    }

    /// Keys of the dynamic types of the current generation
    pub fn dynamic_types(&self) -> &[String] {
        &self.dynamic
    }

    /// Rendering capability registered for a type
    pub fn resolve(&self, type_key: &str) -> Option<Arc<dyn NodeCapability>> {
        self.entries.get(type_key).map(|e| Arc::clone(&e.capability))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, entry: Entry) -> Option<Entry> {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, entry)
    }
}
