//! Configuration parsing and validation
//!
//! This module handles loading Alchemy project configuration.
//!
//! # Configuration Files
//!
//! - `alchemy.yaml` - Project root configuration
//! - `workflows/*.alc` - Workflow sources
//! - `nodes/*.yaml` - Node library (extra built-in node types)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::node::NodeDefinition;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "alchemy.yaml";

/// Extension of workflow source files
pub const SOURCE_EXTENSION: &str = "alc";

/// Root project configuration from `alchemy.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Placement of compiled nodes on the canvas
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Compiler behavior
    #[serde(default)]
    pub compile: CompileConfig,

    /// Directory holding node library files, relative to the project
    #[serde(default = "default_library_dir")]
    pub library: String,

    /// Directory holding workflow sources, relative to the project
    #[serde(default = "default_workflows_dir")]
    pub workflows: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_library_dir() -> String {
    "nodes".to_string()
}

fn default_workflows_dir() -> String {
    "workflows".to_string()
}

/// Canvas layout used for compiled nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Grid columns for workspace nodes
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Grid cell width
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,

    /// Grid cell height
    #[serde(default = "default_cell_height")]
    pub cell_height: f64,

    /// X of the legacy vertical stack
    #[serde(default = "default_legacy_origin")]
    pub legacy_x: f64,

    /// Y of the first node of the legacy vertical stack
    #[serde(default = "default_legacy_origin")]
    pub legacy_y: f64,

    /// Vertical distance between legacy nodes
    #[serde(default = "default_cell_height")]
    pub legacy_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            legacy_x: default_legacy_origin(),
            legacy_y: default_legacy_origin(),
            legacy_spacing: default_cell_height(),
        }
    }
}

fn default_columns() -> usize {
    3
}

fn default_cell_width() -> f64 {
    250.0
}

fn default_cell_height() -> f64 {
    150.0
}

fn default_legacy_origin() -> f64 {
    50.0
}

/// Compiler behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Skip malformed node definitions instead of failing the compile
    #[serde(default)]
    pub isolate_definitions: bool,
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Base path of the project
    pub base_path: PathBuf,
}

impl Config {
    /// Load configuration from a directory
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the project directory or alchemy.yaml file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-project")?;
    /// println!("Project: {}", config.project.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let (config_path, base_path) = if path.is_dir() {
            (path.join(CONFIG_FILE), path.to_path_buf())
        } else {
            (
                path.to_path_buf(),
                path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            )
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let project: ProjectConfig = serde_yaml::from_str(&contents)?;
        if project.layout.columns == 0 {
            return Err(Error::ConfigInvalid {
                message: "layout.columns must be at least 1".to_string(),
            });
        }

        tracing::debug!("Loaded project '{}' from {}", project.name, config_path.display());
        Ok(Self { project, base_path })
    }

    /// Load all node definitions from the library directory (`nodes/*.yaml`)
    pub fn load_library(&self) -> Result<Vec<NodeDefinition>> {
        let library_dir = self.base_path.join(&self.project.library);
        let mut definitions = Vec::new();

        for path in sorted_files(&library_dir, &["yaml", "yml"])? {
            let contents = std::fs::read_to_string(&path)?;
            let definition: NodeDefinition =
                serde_yaml::from_str(&contents).map_err(|source| Error::LibraryParse {
                    path: path.display().to_string(),
                    source,
                })?;
            definition.validate()?;
            tracing::debug!(
                "Loaded library node '{}' from {}",
                definition.type_key,
                path.display()
            );
            definitions.push(definition);
        }
        Ok(definitions)
    }

    /// List workflow sources (`workflows/*.alc`)
    pub fn workflow_files(&self) -> Result<Vec<PathBuf>> {
        sorted_files(
            &self.base_path.join(&self.project.workflows),
            &[SOURCE_EXTENSION],
        )
    }
}

fn sorted_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.contains(&ext))
        })
        .collect();
    files.sort();
    Ok(files)
}
