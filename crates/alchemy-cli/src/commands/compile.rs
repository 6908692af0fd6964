//! Compile a workflow source to JSON

use alchemy_core::CompileOutput;
use anyhow::{Context, Result};
use std::fs;

use super::{format_diagnostic, load_compiler};

/// Run the compile command
pub async fn run(config_path: &str, file: &str, output: Option<&str>, pretty: bool) -> Result<()> {
    let mut compiler = load_compiler(config_path)?;

    tracing::info!("Compiling {}", file);
    let source = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
    let result = compiler.compile(&source);

    let json = render(&result, pretty)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
            tracing::info!("Wrote graph to {}", path);
        }
        None => println!("{}", json),
    }

    if !result.is_ok() {
        for diagnostic in &result.errors {
            eprintln!("{}", format_diagnostic(file, diagnostic));
        }
        anyhow::bail!("Compilation of {} failed", file);
    }

    tracing::info!(
        "✓ {} nodes, {} edges",
        result.nodes.len(),
        result.edges.len()
    );
    Ok(())
}

fn render(output: &CompileOutput, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}
