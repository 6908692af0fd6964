//! Node type inspection commands

use alchemy_core::{NodeDefinition, PortDefinition};
use anyhow::Result;

use super::load_compiler;

/// List node types, built-ins first, then the project library
pub async fn list(config_path: &str, category: Option<&str>) -> Result<()> {
    let compiler = load_compiler(config_path)?;
    let registry = compiler.registry();

    let definitions = match category {
        Some(category) => registry.by_category(category),
        None => registry.all(),
    };
    tracing::debug!("Listing {} node types", definitions.len());

    for definition in definitions {
        println!("{}", summary(definition));
    }
    Ok(())
}

/// Print one node type descriptor as JSON
pub async fn show(config_path: &str, node_type: &str) -> Result<()> {
    let compiler = load_compiler(config_path)?;
    let definition = compiler
        .registry()
        .get(node_type)
        .ok_or_else(|| anyhow::anyhow!("Unknown node type: {}", node_type))?;

    println!("{}", serde_json::to_string_pretty(definition)?);
    Ok(())
}

fn summary(definition: &NodeDefinition) -> String {
    format!(
        "{:<16} {:<10} in: [{}] out: [{}]",
        definition.type_key,
        definition.category,
        port_names(&definition.inputs),
        port_names(&definition.outputs)
    )
}

fn port_names(ports: &[PortDefinition]) -> String {
    ports
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
