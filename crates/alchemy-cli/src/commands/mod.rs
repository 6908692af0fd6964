//! CLI command implementations

use std::path::Path;

use alchemy_core::config::CONFIG_FILE;
use alchemy_core::{Config, Diagnostic, NodeRegistry};
use alchemy_dsl::{CompileOptions, Compiler};
use anyhow::{Context, Result};

pub mod compile;
pub mod init;
pub mod nodes;
pub mod validate;
pub mod watch;

/// Build a compiler for the project at `config_path`: built-ins plus the
/// project's node library, with the project's layout and compile settings.
///
/// A missing default `alchemy.yaml` means no project; the compiler then runs
/// with built-ins only. An explicitly given path must exist.
pub fn load_compiler(config_path: &str) -> Result<Compiler> {
    if config_path == CONFIG_FILE && !Path::new(config_path).exists() {
        tracing::debug!("No {} found, using built-in node types only", CONFIG_FILE);
        return Ok(Compiler::default());
    }

    let config = Config::load(config_path).context("Failed to load configuration")?;
    let library = config
        .load_library()
        .context("Failed to load node library")?;

    let mut registry = NodeRegistry::with_builtins();
    for definition in library {
        registry.register_builtin(definition);
    }
    tracing::debug!(
        "Project '{}': {} node types available",
        config.project.name,
        registry.len()
    );

    Ok(Compiler::with_registry(
        registry,
        CompileOptions::from_config(&config.project),
    ))
}

/// `<file>:<line>:<column>: <message>`, or `<file>: <message>` when the error
/// has no position
pub fn format_diagnostic(file: &str, diagnostic: &Diagnostic) -> String {
    match (diagnostic.line, diagnostic.column) {
        (Some(line), Some(column)) => {
            format!("{}:{}:{}: {}", file, line, column, diagnostic.message)
        }
        (Some(line), None) => format!("{}:{}: {}", file, line, diagnostic.message),
        _ => format!("{}: {}", file, diagnostic.message),
    }
}
