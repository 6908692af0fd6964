//! Syntax tree walking.
//!
//! One pre-order traversal with a caller-supplied closure. Passes that need
//! typed nodes out of the tree (the compile pipeline's collection step, tests)
//! match on [`AstNode`] instead of repeating the recursion.
//!
//! ```rust,ignore
//! let mut names = Vec::new();
//! walk_program(&program, &mut |node| {
//!     if let AstNode::NodeDefinition(def) = node {
//!         names.push(def.name.clone());
//!     }
//! });
//! ```

use crate::ast::{
    Connection, ConnectionsBlock, FunctionCall, NodeDefinition, Program, Statement,
    VariableDeclaration, WorkspaceBlock,
};

/// A borrowed view of one tree node
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'a> {
    /// A node definition, top-level or inside a workspace
    NodeDefinition(&'a NodeDefinition),
    /// A workspace block
    Workspace(&'a WorkspaceBlock),
    /// A connections block
    Connections(&'a ConnectionsBlock),
    /// One wire inside a connections block
    Connection(&'a Connection),
    /// A variable declaration
    VariableDeclaration(&'a VariableDeclaration),
    /// A function call, bare or as a declaration's initializer
    FunctionCall(&'a FunctionCall),
}

/// Walk every statement in pre-order: a block is visited before its children
pub fn walk_program<'a, V>(program: &'a Program, visitor: &mut V)
where
    V: FnMut(AstNode<'a>),
{
    for statement in &program.statements {
        walk_statement(statement, visitor);
    }
}

/// Walk one statement and its children
pub fn walk_statement<'a, V>(statement: &'a Statement, visitor: &mut V)
where
    V: FnMut(AstNode<'a>),
{
    match statement {
        Statement::NodeDefinition(def) => visitor(AstNode::NodeDefinition(def)),
        Statement::Workspace(block) => {
            visitor(AstNode::Workspace(block));
            for def in &block.node_defs {
                visitor(AstNode::NodeDefinition(def));
            }
        }
        Statement::Connections(block) => {
            visitor(AstNode::Connections(block));
            for connection in &block.connections {
                visitor(AstNode::Connection(connection));
            }
        }
        Statement::VariableDeclaration(decl) => {
            visitor(AstNode::VariableDeclaration(decl));
            visitor(AstNode::FunctionCall(&decl.initializer));
        }
        Statement::FunctionCall(call) => visitor(AstNode::FunctionCall(call)),
    }
}

/// What the compile pipeline needs out of a program, gathered in one walk
#[derive(Debug, Default)]
pub struct ProgramIndex<'a> {
    /// Every node definition anywhere in the tree, in source order
    pub definitions: Vec<&'a NodeDefinition>,
    /// The first workspace block
    pub workspace: Option<&'a WorkspaceBlock>,
    /// The first connections block
    pub connections: Option<&'a ConnectionsBlock>,
    /// Variable declarations, in source order
    pub declarations: Vec<&'a VariableDeclaration>,
    /// Function calls, bare or as initializers
    pub calls: usize,
}

impl<'a> ProgramIndex<'a> {
    /// Build the index with a single traversal
    pub fn build(program: &'a Program) -> Self {
        let mut index = ProgramIndex::default();
        walk_program(program, &mut |node| match node {
            AstNode::NodeDefinition(def) => index.definitions.push(def),
            AstNode::Workspace(block) => {
                index.workspace.get_or_insert(block);
            }
            AstNode::Connections(block) => {
                index.connections.get_or_insert(block);
            }
            AstNode::VariableDeclaration(decl) => index.declarations.push(decl),
            AstNode::FunctionCall(_) => index.calls += 1,
            AstNode::Connection(_) => {}
        });
        index
    }

    /// Whether the program uses only the flat legacy surface
    pub fn is_legacy(&self) -> bool {
        self.workspace.is_none() && self.connections.is_none() && self.calls > 0
    }
}
