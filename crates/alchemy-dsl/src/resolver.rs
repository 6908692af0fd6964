//! Workspace and connection resolution.
//!
//! Turns the workspace block into positioned node instances and the
//! connections block into edges between them.

use std::collections::HashMap;

use alchemy_core::{Edge, Graph, LayoutConfig, NodeData, NodeInstance, NodeRegistry, Position};
use serde_json::{Map, Value};

use crate::ast::{self, ConnectionsBlock, Literal, PortRef, WorkspaceBlock};
use crate::error::{Error, Result};
use crate::synth;

/// Resolves a workspace against a registry
pub struct Resolver<'r> {
    registry: &'r mut NodeRegistry,
    layout: LayoutConfig,
    isolate_definitions: bool,
}

impl<'r> Resolver<'r> {
    /// Create a resolver
    pub fn new(registry: &'r mut NodeRegistry, layout: LayoutConfig) -> Self {
        Self {
            registry,
            layout,
            isolate_definitions: false,
        }
    }

    /// Skip workspace entries whose definition fails validation instead of
    /// failing the whole resolve
    pub fn isolate_definitions(mut self, isolate: bool) -> Self {
        self.isolate_definitions = isolate;
        self
    }

    /// Resolve a workspace and optional connections into a graph
    pub fn resolve(
        &mut self,
        workspace: &WorkspaceBlock,
        connections: Option<&ConnectionsBlock>,
    ) -> Result<Graph> {
        let nodes = self.instantiate(workspace)?;
        let edges = match connections {
            Some(block) => connect(&nodes, block)?,
            None => Vec::new(),
        };

        tracing::debug!(
            "Resolved workspace: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );
        Ok(Graph { nodes, edges })
    }

    /// Build one instance per workspace entry, registering unknown types
    pub fn instantiate(&mut self, workspace: &WorkspaceBlock) -> Result<Vec<NodeInstance>> {
        let mut nodes = Vec::with_capacity(workspace.node_defs.len());

        for decl in &workspace.node_defs {
            if !self.registry.has(&decl.name) {
                match synth::synthesize_validated(decl) {
                    Ok(definition) => self.registry.register_dynamic(definition, None),
                    Err(err) if self.isolate_definitions => {
                        tracing::warn!("Skipping workspace node '{}': {}", decl.name, err);
                        continue;
                    }
                    Err(err) => return Err(err),
                }
            }

            let definition = self.registry.get(&decl.name).cloned().ok_or_else(|| {
                Error::Internal(format!("type '{}' vanished from the registry", decl.name))
            })?;

            let index = nodes.len();
            nodes.push(NodeInstance {
                id: format!("node_{}", index),
                node_type: decl.name.clone(),
                position: self.grid_position(index),
                data: NodeData {
                    label: decl.name.clone(),
                    parameters: instance_parameters(decl, &definition),
                    node_definition: definition,
                    is_dynamic: true,
                },
            });
        }

        Ok(nodes)
    }

    fn grid_position(&self, index: usize) -> Position {
        let columns = self.layout.columns.max(1);
        let column = (index % columns) as f64;
        let row = (index / columns) as f64;
        Position::new(column * self.layout.cell_width, row * self.layout.cell_height)
    }
}

/// Parameter values at an instantiation site: the first constraint of the
/// entry's own parameter of that name, or null.
fn instance_parameters(
    decl: &ast::NodeDefinition,
    definition: &alchemy_core::NodeDefinition,
) -> Map<String, Value> {
    definition
        .parameters
        .iter()
        .map(|param| {
            let value = decl
                .parameter(&param.name)
                .and_then(|spec| spec.constraints.first())
                .map(Literal::to_value)
                .unwrap_or(Value::Null);
            (param.name.clone(), value)
        })
        .collect()
}

/// Turn connections into edges between already-built instances.
///
/// Endpoints are matched by declared name. A name used twice resolves to its
/// last instance.
pub fn connect(nodes: &[NodeInstance], connections: &ConnectionsBlock) -> Result<Vec<Edge>> {
    let ids: HashMap<&str, &str> = nodes
        .iter()
        .map(|node| (node.node_type.as_str(), node.id.as_str()))
        .collect();

    let lookup = |port: &PortRef| -> Result<String> {
        ids.get(port.node_name.as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| {
                Error::resolution(
                    format!("node not found: {}", port.node_name),
                    Some(port.location),
                )
            })
    };

    connections
        .connections
        .iter()
        .enumerate()
        .map(|(index, connection)| {
            Ok(Edge {
                id: format!("edge_{}", index),
                source: lookup(&connection.from)?,
                source_handle: connection.from.port_name.clone(),
                target: lookup(&connection.to)?,
                target_handle: connection.to.port_name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Connection, Location, ParameterSpec};

    fn entry(name: &str) -> ast::NodeDefinition {
        let mut def = ast::NodeDefinition::new(name, Location::new(1, 1));
        def.add_input("in", "image");
        def.add_output("out", "image");
        def
    }

    fn workspace(entries: Vec<ast::NodeDefinition>) -> WorkspaceBlock {
        WorkspaceBlock {
            node_defs: entries,
            location: Location::new(1, 1),
        }
    }

    fn wire(from: &str, to: &str) -> Connection {
        let port = |s: &str, column: usize| {
            let (node, port) = s.split_once('.').unwrap();
            PortRef {
                node_name: node.into(),
                port_name: port.into(),
                location: Location::new(7, column),
            }
        };
        Connection {
            from: port(from, 5),
            to: port(to, 15),
        }
    }

    fn connections(wires: Vec<Connection>) -> ConnectionsBlock {
        ConnectionsBlock {
            connections: wires,
            location: Location::new(6, 1),
        }
    }

    #[test]
    fn test_grid_layout_and_ids() {
        let mut registry = NodeRegistry::with_builtins();
        let block = workspace(vec![
            entry("A"),
            entry("B"),
            entry("C"),
            entry("D"),
            entry("E"),
        ]);

        let graph = Resolver::new(&mut registry, LayoutConfig::default())
            .resolve(&block, None)
            .unwrap();

        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["node_0", "node_1", "node_2", "node_3", "node_4"]);
        assert_eq!(graph.nodes[2].position, Position::new(500.0, 0.0));
        assert_eq!(graph.nodes[3].position, Position::new(0.0, 150.0));
        assert_eq!(graph.nodes[4].position, Position::new(250.0, 150.0));
        assert!(graph.edges.is_empty());

        assert!(registry.is_dynamic("A"));
        assert_eq!(registry.dynamic_types().len(), 5);
    }

    #[test]
    fn test_custom_layout() {
        let mut registry = NodeRegistry::empty();
        let layout = LayoutConfig {
            columns: 2,
            cell_width: 100.0,
            cell_height: 80.0,
            ..LayoutConfig::default()
        };
        let block = workspace(vec![entry("A"), entry("B"), entry("C")]);

        let graph = Resolver::new(&mut registry, layout)
            .resolve(&block, None)
            .unwrap();
        assert_eq!(graph.nodes[1].position, Position::new(100.0, 0.0));
        assert_eq!(graph.nodes[2].position, Position::new(0.0, 80.0));
    }

    #[test]
    fn test_instance_parameters_from_entry_constraints() {
        let mut registry = NodeRegistry::empty();
        let mut def = entry("Blur");
        def.add_parameter(ParameterSpec {
            name: "radius".into(),
            kind_name: "slider".into(),
            constraints: vec![Literal::Number(0.0), Literal::Number(10.0)],
        });
        def.add_parameter(ParameterSpec {
            name: "label".into(),
            kind_name: "text".into(),
            constraints: vec![],
        });

        let graph = Resolver::new(&mut registry, LayoutConfig::default())
            .resolve(&workspace(vec![def]), None)
            .unwrap();

        let data = &graph.nodes[0].data;
        assert_eq!(data.label, "Blur");
        assert!(data.is_dynamic);
        assert_eq!(data.parameters["radius"], Value::from(0));
        assert_eq!(data.parameters["label"], Value::Null);
        assert_eq!(data.node_definition.category, "dynamic");
    }

    #[test]
    fn test_edges_use_literal_handles() {
        let mut registry = NodeRegistry::empty();
        let block = workspace(vec![entry("A"), entry("B")]);
        let wires = connections(vec![wire("A.out", "B.in"), wire("B.whatever", "A.in")]);

        let graph = Resolver::new(&mut registry, LayoutConfig::default())
            .resolve(&block, Some(&wires))
            .unwrap();

        assert_eq!(
            graph.edges,
            vec![
                Edge {
                    id: "edge_0".into(),
                    source: "node_0".into(),
                    source_handle: "out".into(),
                    target: "node_1".into(),
                    target_handle: "in".into(),
                },
                Edge {
                    id: "edge_1".into(),
                    source: "node_1".into(),
                    source_handle: "whatever".into(),
                    target: "node_0".into(),
                    target_handle: "in".into(),
                },
            ]
        );
    }

    #[test]
    fn test_repeated_name_maps_to_last_instance() {
        let mut registry = NodeRegistry::empty();
        let block = workspace(vec![entry("A"), entry("B"), entry("A")]);
        let wires = connections(vec![wire("A.out", "B.in")]);

        let graph = Resolver::new(&mut registry, LayoutConfig::default())
            .resolve(&block, Some(&wires))
            .unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges[0].source, "node_2");
    }

    #[test]
    fn test_unknown_node_is_resolution_error() {
        let mut registry = NodeRegistry::empty();
        let block = workspace(vec![entry("A")]);
        let wires = connections(vec![wire("A.out", "Missing.in")]);

        let err = Resolver::new(&mut registry, LayoutConfig::default())
            .resolve(&block, Some(&wires))
            .unwrap_err();

        assert_eq!(err.to_string(), "node not found: Missing");
        let diagnostic = err.to_diagnostic();
        assert_eq!((diagnostic.line, diagnostic.column), (Some(7), Some(15)));
    }

    #[test]
    fn test_invalid_entry_fails_or_is_skipped() {
        let mut bad = entry("Bad");
        bad.outputs[0].type_name.clear();
        let block = workspace(vec![entry("A"), bad, entry("C")]);

        let mut registry = NodeRegistry::empty();
        let err = Resolver::new(&mut registry, LayoutConfig::default())
            .resolve(&block, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid output definition in node Bad");

        let mut registry = NodeRegistry::empty();
        let graph = Resolver::new(&mut registry, LayoutConfig::default())
            .isolate_definitions(true)
            .resolve(&block, None)
            .unwrap();
        let types: Vec<_> = graph.nodes.iter().map(|n| n.node_type.as_str()).collect();
        assert_eq!(types, vec!["A", "C"]);
        assert_eq!(graph.nodes[1].id, "node_1");
        assert!(!registry.has("Bad"));
    }
}
