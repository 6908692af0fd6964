//! The compile pipeline.
//!
//! ```text
//! clear dynamic types → tokenize → parse → collect definitions
//!     → synthesize + register → resolve workspace (or legacy statements)
//! ```
//!
//! [`Compiler::compile`] never fails: every error, a panic included, comes
//! back as a diagnostic in the [`CompileOutput`].

use std::panic::{self, AssertUnwindSafe};

use alchemy_core::{CompileOutput, Graph, LayoutConfig, NodeRegistry, ProjectConfig};
use tokio_util::sync::CancellationToken;

use crate::ast::{self, Program};
use crate::error::{Error, Result};
use crate::legacy::LegacyResolver;
use crate::lexer;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::synth;
use crate::walk::ProgramIndex;

/// Compiler settings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompileOptions {
    /// Canvas placement of compiled nodes
    pub layout: LayoutConfig,

    /// Skip malformed node definitions (logged at warn) instead of failing
    pub isolate_definitions: bool,
}

impl CompileOptions {
    /// Take the options from a project configuration
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            layout: config.layout,
            isolate_definitions: config.compile.isolate_definitions,
        }
    }
}

/// Compiles sources against the registry it owns.
///
/// Dynamic types from one compile live until the next one starts.
#[derive(Debug)]
pub struct Compiler {
    registry: NodeRegistry,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl Compiler {
    /// Create a compiler with the built-in node types
    pub fn new(options: CompileOptions) -> Self {
        Self::with_registry(NodeRegistry::with_builtins(), options)
    }

    /// Create a compiler over an existing registry (e.g. one seeded from a
    /// node library)
    pub fn with_registry(registry: NodeRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    /// The registry, including dynamic types from the last compile
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for registering static types
    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    /// The settings in use
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a source string
    pub fn compile(&mut self, source: &str) -> CompileOutput {
        self.compile_cancellable(source, &CancellationToken::new())
    }

    /// Compile a source string, giving up between stages once `cancel` fires
    pub fn compile_cancellable(
        &mut self,
        source: &str,
        cancel: &CancellationToken,
    ) -> CompileOutput {
        contain(|| self.try_compile(source, cancel))
    }

    /// Compile an already-parsed program
    pub fn compile_program(&mut self, program: &Program) -> CompileOutput {
        let cancel = CancellationToken::new();
        contain(|| {
            self.registry.clear_dynamic();
            self.build(program, &cancel)
        })
    }

    /// Run the pipeline, returning the first error
    pub fn try_compile(&mut self, source: &str, cancel: &CancellationToken) -> Result<Graph> {
        self.registry.clear_dynamic();
        checkpoint(cancel)?;

        let tokens = lexer::tokenize(source);
        tracing::debug!("Tokenized {} tokens", tokens.len());

        let program = Parser::new(tokens).parse().into_result()?;
        checkpoint(cancel)?;

        self.build(&program, cancel)
    }

    fn build(&mut self, program: &Program, cancel: &CancellationToken) -> Result<Graph> {
        let index = ProgramIndex::build(program);
        self.register_definitions(&index.definitions)?;
        checkpoint(cancel)?;

        if index.is_legacy() {
            return Ok(LegacyResolver::new(&self.registry, self.options.layout).resolve(program));
        }

        let workspace = index
            .workspace
            .ok_or_else(|| Error::resolution("no workspace block found", None))?;

        Resolver::new(&mut self.registry, self.options.layout)
            .isolate_definitions(self.options.isolate_definitions)
            .resolve(workspace, index.connections)
    }

    fn register_definitions(&mut self, definitions: &[&ast::NodeDefinition]) -> Result<()> {
        for def in definitions {
            match synth::synthesize_validated(def) {
                Ok(descriptor) => self.registry.register_dynamic(descriptor, None),
                Err(err) if self.options.isolate_definitions => {
                    tracing::warn!("Skipping node definition '{}': {}", def.name, err);
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(
            "Registered {} dynamic node types",
            self.registry.dynamic_types().len()
        );
        Ok(())
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Run a pipeline and turn every outcome, a panic included, into output
fn contain(run: impl FnOnce() -> Result<Graph>) -> CompileOutput {
    let outcome = panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!("Compiler panicked: {}", message);
        Err(Error::Internal(message))
    });

    match outcome {
        Ok(graph) => {
            tracing::info!(
                "Compiled {} nodes, {} edges",
                graph.nodes.len(),
                graph.edges.len()
            );
            graph.into()
        }
        Err(err) => {
            tracing::debug!("Compile failed: {}", err);
            CompileOutput::failed(vec![err.to_diagnostic()])
        }
    }
}
