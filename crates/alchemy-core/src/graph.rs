//! Compiled graph contract
//!
//! A compile produces ordered node instances and ordered port-to-port edges,
//! or, on failure, no graph and a list of diagnostics. The serialized shape
//! is what editors consume:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "node_0", "type": "Blur", "position": { "x": 0, "y": 0 },
//!               "data": { "label": "Blur", "parameters": { "radius": 0 },
//!                         "nodeDefinition": { ... }, "isDynamic": true } }],
//!   "edges": [{ "id": "edge_0", "source": "node_0", "sourceHandle": "out",
//!               "target": "node_0", "targetHandle": "in" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::NodeDefinition;

/// Canvas position of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset
    pub x: f64,
    /// Vertical offset
    pub y: f64,
}

impl Position {
    /// Create a position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-instance payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Display label
    pub label: String,

    /// Parameter values by parameter name (null when unset)
    pub parameters: Map<String, Value>,

    /// Full descriptor of the instance's type
    pub node_definition: NodeDefinition,

    /// Whether the type was synthesized from source in this compile
    pub is_dynamic: bool,
}

/// An instantiated node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstance {
    /// Generated id (`node_<index>`)
    pub id: String,

    /// Type key
    #[serde(rename = "type")]
    pub node_type: String,

    /// Canvas position
    pub position: Position,

    /// Payload
    pub data: NodeData,
}

/// A directed port-to-port wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Generated id (`edge_<index>`)
    pub id: String,

    /// Source node id
    pub source: String,

    /// Source port name
    pub source_handle: String,

    /// Target node id
    pub target: String,

    /// Target port name
    pub target_handle: String,
}

/// Nodes and edges of a successful compile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Ordered node instances
    pub nodes: Vec<NodeInstance>,

    /// Ordered edges
    pub edges: Vec<Edge>,
}

/// A user-facing compile error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error message
    pub message: String,

    /// 1-based source line, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// 1-based source column, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    /// A diagnostic with no source location
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// A diagnostic pointing at a source location
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{}: {}", line, column, self.message),
            (Some(line), None) => write!(f, "{}: {}", line, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Result record of one compile: a graph, or empty nodes/edges plus errors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompileOutput {
    /// Ordered node instances (empty on failure)
    pub nodes: Vec<NodeInstance>,

    /// Ordered edges (empty on failure)
    pub edges: Vec<Edge>,

    /// Errors (empty on success)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Diagnostic>,
}

impl CompileOutput {
    /// A failed compile
    pub fn failed(errors: Vec<Diagnostic>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            errors,
        }
    }

    /// Whether the compile succeeded
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Split into the graph or the errors
    pub fn into_result(self) -> std::result::Result<Graph, Vec<Diagnostic>> {
        if self.errors.is_empty() {
            Ok(Graph {
                nodes: self.nodes,
                edges: self.edges,
            })
        } else {
            Err(self.errors)
        }
    }
}

impl From<Graph> for CompileOutput {
    fn from(graph: Graph) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            errors: Vec::new(),
        }
    }
}
