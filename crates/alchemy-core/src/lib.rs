//! Alchemy Core Library
//!
//! This crate provides the data side of the Alchemy workflow compiler:
//! - Canonical node type descriptors (ports and parameters)
//! - The node type registry with dynamic, per-compile registrations
//! - The compiled graph contract handed to editors
//! - Project configuration and node libraries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Built-ins  │────▶│  Registry   │────▶│    Graph    │
//! │  + Library  │     │ (+ dynamic) │     │ nodes/edges │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use alchemy_core::{Config, NodeRegistry};
//!
//! let config = Config::load("./my-project")?;
//! let mut registry = NodeRegistry::with_builtins();
//! for definition in config.load_library()? {
//!     registry.register_builtin(definition);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtins;
pub mod capability;
pub mod config;
pub mod error;
pub mod graph;
pub mod node;
pub mod registry;

pub use capability::{NodeCapability, RendererCapability};
pub use config::{CompileConfig, Config, LayoutConfig, ProjectConfig};
pub use error::{Error, Result};
pub use graph::{CompileOutput, Diagnostic, Edge, Graph, NodeData, NodeInstance, Position};
pub use node::{NodeDefinition, ParameterDefinition, ParameterKind, PortDefinition, PortType};
pub use registry::NodeRegistry;
