//! Abstract syntax tree for workflow sources.
//!
//! The tree mirrors the two statement surfaces of the language: structured
//! `node`/`workspace`/`connections` blocks, and the flat legacy form of
//! variable declarations and function calls.

use serde_json::Value;

/// 1-based source position. `0:0` marks a node that was not parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Line
    pub line: usize,
    /// Column
    pub column: usize,
}

impl Location {
    /// Create a location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Whether the location points into source text
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Statement>,
}

/// A top-level statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `node Name { ... }`
    NodeDefinition(NodeDefinition),
    /// `workspace { ... }`
    Workspace(WorkspaceBlock),
    /// `connections { ... }`
    Connections(ConnectionsBlock),
    /// `name = Call(...)`
    VariableDeclaration(VariableDeclaration),
    /// `Call(...)`
    FunctionCall(FunctionCall),
}

/// A declared input or output port
#[derive(Debug, Clone, PartialEq)]
pub struct PortDecl {
    /// Port name
    pub name: String,
    /// Declared type name, as written
    pub type_name: String,
}

/// A declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// Declared kind, as written
    pub kind_name: String,
    /// Literals inside the optional parentheses
    pub constraints: Vec<Literal>,
}

/// `node Name { inputs {...} outputs {...} parameters {...} }`
///
/// Ports and parameters are kept in declaration order. Declaring a name twice
/// replaces the earlier entry in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefinition {
    /// Node name, which doubles as its type key
    pub name: String,
    /// Input ports
    pub inputs: Vec<PortDecl>,
    /// Output ports
    pub outputs: Vec<PortDecl>,
    /// Parameters
    pub parameters: Vec<ParameterSpec>,
    /// Location of the `node` keyword
    pub location: Location,
}

impl NodeDefinition {
    /// Create an empty definition
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            location,
        }
    }

    /// Add or replace an input port
    pub fn add_input(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        upsert_port(&mut self.inputs, name.into(), type_name.into());
    }

    /// Add or replace an output port
    pub fn add_output(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        upsert_port(&mut self.outputs, name.into(), type_name.into());
    }

    /// Add or replace a parameter
    pub fn add_parameter(&mut self, spec: ParameterSpec) {
        match self.parameters.iter_mut().find(|p| p.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.parameters.push(spec),
        }
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

fn upsert_port(ports: &mut Vec<PortDecl>, name: String, type_name: String) {
    match ports.iter_mut().find(|p| p.name == name) {
        Some(existing) => existing.type_name = type_name,
        None => ports.push(PortDecl { name, type_name }),
    }
}

/// `workspace { node ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceBlock {
    /// Nodes placed on the canvas, in order
    pub node_defs: Vec<NodeDefinition>,
    /// Location of the `workspace` keyword
    pub location: Location,
}

/// `connections { A.out -> B.in; ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionsBlock {
    /// Wires, in order
    pub connections: Vec<Connection>,
    /// Location of the `connections` keyword
    pub location: Location,
}

/// `from -> to`
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Source endpoint
    pub from: PortRef,
    /// Target endpoint
    pub to: PortRef,
}

/// `Node.port`
#[derive(Debug, Clone, PartialEq)]
pub struct PortRef {
    /// Declared node name
    pub node_name: String,
    /// Port name
    pub port_name: String,
    /// Location of the node name
    pub location: Location,
}

/// `name = Call(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// Variable name
    pub name: String,
    /// The call that creates the node
    pub initializer: FunctionCall,
    /// Location of the variable name
    pub location: Location,
}

/// `Call(arg, key = value, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Called name (a node type key)
    pub name: String,
    /// Positional arguments in order
    pub positional_args: Vec<Literal>,
    /// Named arguments in order; a repeated key replaces the earlier value
    pub named_args: Vec<(String, Literal)>,
    /// Location of the called name
    pub location: Location,
}

impl FunctionCall {
    /// Add or replace a named argument
    pub fn set_named(&mut self, key: impl Into<String>, value: Literal) {
        let key = key.into();
        match self.named_args.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.named_args.push((key, value)),
        }
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numeric literal
    Number(f64),
    /// String literal, quotes stripped
    String(String),
    /// Bare identifier
    Ident(String),
}

impl Literal {
    /// Convert to a JSON value. Identifiers become strings.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Number(n) => json_number(*n),
            Literal::String(s) | Literal::Ident(s) => Value::String(s.clone()),
        }
    }

    /// The identifier name, if this is a bare identifier
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Literal::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// JSON form of a number: integral values become JSON integers, non-finite
/// values become null
pub fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
