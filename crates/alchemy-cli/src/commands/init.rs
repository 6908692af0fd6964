//! Initialize a new Alchemy project

use alchemy_core::config::CONFIG_FILE;
use anyhow::Result;
use std::fs;
use std::path::Path;

const EXAMPLE_WORKFLOW: &str = r#"// Example workflow: load an image, blur it, preview the result
workspace {
    node Source {
        outputs { image: image }
        parameters { path: text("input.png") }
    }

    node Blur {
        inputs { in: image }
        outputs { out: image }
        parameters {
            radius: slider(0, 10, 1),
            mode: dropdown("gaussian", "box")
        }
    }

    node Preview {
        inputs { in: image }
    }
}

connections {
    Source.image -> Blur.in;
    Blur.out -> Preview.in
}
"#;

const EXAMPLE_NODE: &str = r#"# Library node types are available to every workflow in the project
type: Threshold
category: filters
description: Turn an image into black and white
inputs:
  - name: in
    type: image
    displayName: In
outputs:
  - name: out
    type: image
    displayName: Out
parameters:
  - name: level
    type: slider
    displayName: Level
    defaultValue: 128
    min: 0
    max: 255
    step: 1
"#;

/// Run the init command
pub async fn run(path: &str, name: Option<&str>) -> Result<()> {
    let project_dir = Path::new(path);

    if !project_dir.exists() {
        fs::create_dir_all(project_dir)?;
    }

    let abs_path = project_dir.canonicalize()?;

    let project_name = match name {
        Some(n) => n.to_string(),
        None => abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Could not determine project name from path"))?,
    };

    if project_dir.join(CONFIG_FILE).exists() {
        anyhow::bail!(
            "Directory '{}' already contains an {}",
            project_dir.display(),
            CONFIG_FILE
        );
    }

    tracing::info!("Creating new Alchemy project: {}", project_name);

    fs::create_dir_all(project_dir.join("workflows"))?;
    fs::create_dir_all(project_dir.join("nodes"))?;

    // A JSON string is a valid double-quoted YAML scalar
    let quoted_name = serde_json::to_string(&project_name)?;
    let config = format!(
        r#"# Alchemy Project Configuration
name: {quoted_name}
version: "0.1.0"

# Canvas placement of compiled nodes
layout:
  columns: 3
  cell_width: 250
  cell_height: 150

compile:
  # Skip malformed node definitions instead of failing the whole compile
  isolate_definitions: false
"#
    );
    fs::write(project_dir.join(CONFIG_FILE), config)?;
    fs::write(project_dir.join("workflows/example.alc"), EXAMPLE_WORKFLOW)?;
    fs::write(project_dir.join("nodes/threshold.yaml"), EXAMPLE_NODE)?;

    tracing::info!(
        "✓ Created project '{}' at {}",
        project_name,
        abs_path.display()
    );
    tracing::info!("Next steps:");
    if path != "." {
        tracing::info!("  cd {}", project_dir.display());
    }
    tracing::info!("  alchemy validate workflows             # Check sources");
    tracing::info!("  alchemy compile workflows/example.alc  # Print the graph");

    Ok(())
}
