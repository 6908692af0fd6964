//! The flat legacy surface: `name = Type(args)` statements.
//!
//! Each declaration that calls a registered type becomes a node stacked
//! vertically on the canvas. A positional argument naming an earlier variable
//! wires that variable's node into the matching input.

use std::collections::HashMap;

use alchemy_core::node::{display_value, numeric_value};
use alchemy_core::{
    Edge, Graph, LayoutConfig, NodeData, NodeDefinition, NodeInstance, NodeRegistry,
    ParameterKind, Position,
};
use serde_json::{Map, Value};

use crate::ast::{FunctionCall, Literal, Program, Statement, json_number};

/// Resolves legacy statements against a registry
pub struct LegacyResolver<'r> {
    registry: &'r NodeRegistry,
    layout: LayoutConfig,
}

impl<'r> LegacyResolver<'r> {
    /// Create a resolver
    pub fn new(registry: &'r NodeRegistry, layout: LayoutConfig) -> Self {
        Self { registry, layout }
    }

    /// Build the graph. Calls to unknown types and bare call statements
    /// produce nothing.
    pub fn resolve(&self, program: &Program) -> Graph {
        let mut graph = Graph::default();
        let mut variables: HashMap<&str, usize> = HashMap::new();

        for statement in &program.statements {
            let Statement::VariableDeclaration(decl) = statement else {
                continue;
            };
            let call = &decl.initializer;
            let Some(definition) = self.registry.get(&call.name) else {
                tracing::debug!(
                    "Skipping '{}': no node type named '{}'",
                    decl.name,
                    call.name
                );
                continue;
            };

            let index = graph.nodes.len();
            graph.nodes.push(NodeInstance {
                id: format!("node_{}", index),
                node_type: call.name.clone(),
                position: Position::new(
                    self.layout.legacy_x,
                    self.layout.legacy_y + self.layout.legacy_spacing * index as f64,
                ),
                data: NodeData {
                    label: decl.name.clone(),
                    parameters: call_parameters(call, definition),
                    node_definition: definition.clone(),
                    is_dynamic: self.registry.is_dynamic(&call.name),
                },
            });
            // Bound before arguments are read, so `a = T(a)` wires to itself
            variables.insert(&decl.name, index);

            if definition.inputs.is_empty() {
                continue;
            }
            for (position, arg) in call.positional_args.iter().enumerate() {
                let Some(&source) = arg.as_ident().and_then(|name| variables.get(name)) else {
                    continue;
                };
                let source_node = &graph.nodes[source];
                let edge = Edge {
                    id: format!("edge_{}", graph.edges.len()),
                    source: source_node.id.clone(),
                    source_handle: source_node
                        .data
                        .node_definition
                        .outputs
                        .first()
                        .map_or_else(|| "output".to_string(), |p| p.name.clone()),
                    target: graph.nodes[index].id.clone(),
                    target_handle: definition
                        .inputs
                        .get(position)
                        .map_or_else(|| format!("input_{}", position), |p| p.name.clone()),
                };
                graph.edges.push(edge);
            }
        }

        tracing::debug!(
            "Resolved legacy program: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        graph
    }
}

/// Descriptor defaults, overridden by named arguments converted per kind
fn call_parameters(call: &FunctionCall, definition: &NodeDefinition) -> Map<String, Value> {
    let mut parameters: Map<String, Value> = definition
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.default_value.clone().unwrap_or(Value::Null)))
        .collect();

    for (key, literal) in &call.named_args {
        let Some(param) = definition.parameter(key) else {
            continue;
        };
        parameters.insert(key.clone(), convert(literal, param.kind));
    }
    parameters
}

fn convert(literal: &Literal, kind: ParameterKind) -> Value {
    let value = literal.to_value();
    match kind {
        ParameterKind::Number | ParameterKind::Slider => {
            numeric_value(&value).map_or(Value::Null, json_number)
        }
        ParameterKind::Text | ParameterKind::Dropdown => Value::String(display_value(&value)),
    }
}
