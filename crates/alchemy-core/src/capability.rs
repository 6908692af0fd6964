//! Rendering capabilities
//!
//! The compiler never renders anything. Editors register a capability per
//! node type (the thing able to draw the declared ports as connection points
//! and the declared parameters as controls) and look it up by type through
//! [`NodeRegistry::resolve`](crate::NodeRegistry::resolve). The descriptor
//! itself stays data-only.

use std::fmt;
use std::sync::Arc;

/// Renderer key used for types synthesized from source
pub const GENERIC_RENDERER: &str = "dynamic-node";

/// Trait for whatever an editor uses to draw a node type
pub trait NodeCapability: Send + Sync + fmt::Debug {
    /// Identifier of the renderer (component name, widget id, ...)
    fn renderer(&self) -> &str;
}

/// A capability identified only by its renderer key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCapability {
    renderer: String,
}

impl RendererCapability {
    /// Create a capability for the named renderer
    pub fn new(renderer: impl Into<String>) -> Self {
        Self {
            renderer: renderer.into(),
        }
    }

    /// The capability given to dynamic types when none is supplied
    pub fn generic() -> Arc<dyn NodeCapability> {
        Arc::new(Self::new(GENERIC_RENDERER))
    }
}

impl NodeCapability for RendererCapability {
    fn renderer(&self) -> &str {
        &self.renderer
    }
}
