//! Validate workflow sources

use alchemy_core::config::SOURCE_EXTENSION;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{format_diagnostic, load_compiler};

/// Run the validate command
pub async fn run(config_path: &str, path: &str) -> Result<()> {
    let mut compiler = load_compiler(config_path)?;
    let files = source_files(Path::new(path))?;

    if files.is_empty() {
        tracing::info!("No .{} files found under {}", SOURCE_EXTENSION, path);
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        let display = file.display().to_string();
        let source =
            std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", display))?;

        let output = compiler.compile(&source);
        if output.is_ok() {
            tracing::info!("✓ {}", file.display());
        } else {
            failed += 1;
            for diagnostic in &output.errors {
                eprintln!("{}", format_diagnostic(&display, diagnostic));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed validation", failed, files.len());
    }

    tracing::info!("✓ {} file(s) valid", files.len());
    Ok(())
}

/// The file itself, or every source file under a directory in path order
fn source_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let is_source = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == SOURCE_EXTENSION);
        if entry.file_type().is_file() && is_source {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
