//! Integration tests for project configuration and node libraries
//!
//! Tests use temporary directories with real file fixtures to verify:
//! - Project config loading from a directory or the file itself
//! - Node library loading and validation
//! - Workflow source discovery
//! - Library types seeding a registry

use alchemy_core::{Config, Error, NodeRegistry, ParameterKind, PortType};
use tempfile::TempDir;

/// Helper to create a temporary project directory with standard structure.
///
/// Returns a `TempDir` that automatically cleans up when dropped.
fn setup_project(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("nodes")).unwrap();
    std::fs::create_dir_all(dir.path().join("workflows")).unwrap();
    std::fs::write(dir.path().join("alchemy.yaml"), config).unwrap();
    dir
}

const THRESHOLD: &str = r#"
type: Threshold
category: filters
description: Binarize an image
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

const INVERT: &str = r#"
type: Invert
category: filters
inputs:
  - name: in
    type: IMAGE
    displayName: In
outputs:
  - name: out
    type: image
    displayName: Out
"#;

// =============================================================================
// Project config
// =============================================================================

#[test]
fn test_load_from_directory_and_file() {
    let dir = setup_project("name: pipeline\nversion: \"2.0.0\"\n");

    let from_dir = Config::load(dir.path()).unwrap();
    assert_eq!(from_dir.project.name, "pipeline");
    assert_eq!(from_dir.project.version, "2.0.0");
    assert_eq!(from_dir.base_path, dir.path());

    let from_file = Config::load(dir.path().join("alchemy.yaml")).unwrap();
    assert_eq!(from_file.project.name, "pipeline");
    assert_eq!(from_file.base_path, dir.path());
}

#[test]
fn test_invalid_yaml_is_parse_error() {
    let dir = setup_project("name: [unterminated\n");
    let err = Config::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
}

// =============================================================================
// Node library
// =============================================================================

#[test]
fn test_load_library_sorted_by_file_name() {
    let dir = setup_project("name: lib\n");
    std::fs::write(dir.path().join("nodes/b_threshold.yaml"), THRESHOLD).unwrap();
    std::fs::write(dir.path().join("nodes/a_invert.yml"), INVERT).unwrap();
    std::fs::write(dir.path().join("nodes/README.md"), "ignored").unwrap();

    let config = Config::load(dir.path()).unwrap();
    let library = config.load_library().unwrap();

    assert_eq!(library.len(), 2);
    assert_eq!(library[0].type_key, "Invert");
    assert_eq!(library[0].inputs[0].data_type, PortType::Image);
    assert_eq!(library[1].type_key, "Threshold");

    let level = library[1].parameter("level").unwrap();
    assert_eq!(level.kind, ParameterKind::Slider);
    assert_eq!(level.max, Some(255.0));
}

#[test]
fn test_load_library_missing_directory_is_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("alchemy.yaml"), "name: bare\n").unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert!(config.load_library().unwrap().is_empty());
    assert!(config.workflow_files().unwrap().is_empty());
}

#[test]
fn test_load_library_rejects_duplicate_parameters() {
    let dir = setup_project("name: lib\n");
    std::fs::write(
        dir.path().join("nodes/dup.yaml"),
        r#"
type: Dup
category: filters
parameters:
  - name: level
    displayName: Level
  - name: level
    displayName: Level again
"#,
    )
    .unwrap();

    let config = Config::load(dir.path()).unwrap();
    let err = config.load_library().unwrap_err();
    assert!(matches!(err, Error::InvalidDefinition { ref type_key, .. } if type_key == "Dup"));
}

#[test]
fn test_load_library_parse_error_names_file() {
    let dir = setup_project("name: lib\n");
    std::fs::write(dir.path().join("nodes/broken.yaml"), "type: [Broken\n").unwrap();

    let config = Config::load(dir.path()).unwrap();
    let err = config.load_library().unwrap_err();
    assert!(matches!(err, Error::LibraryParse { ref path, .. } if path.ends_with("broken.yaml")));
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn test_custom_library_directory() {
    let dir = setup_project("name: lib\nlibrary: custom_nodes\n");
    std::fs::create_dir_all(dir.path().join("custom_nodes")).unwrap();
    std::fs::write(dir.path().join("custom_nodes/invert.yaml"), INVERT).unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.load_library().unwrap().len(), 1);
}

#[test]
fn test_library_seeds_registry_as_static_types() {
    let dir = setup_project("name: lib\n");
    std::fs::write(dir.path().join("nodes/threshold.yaml"), THRESHOLD).unwrap();

    let config = Config::load(dir.path()).unwrap();
    let mut registry = NodeRegistry::with_builtins();
    for definition in config.load_library().unwrap() {
        registry.register_builtin(definition);
    }

    assert!(registry.has("Threshold"));
    assert!(!registry.is_dynamic("Threshold"));
    assert_eq!(registry.by_category("filters").len(), 1);
    assert_eq!(registry.resolve("Threshold").unwrap().renderer(), "Threshold");

    registry.clear_dynamic();
    assert!(registry.has("Threshold"));
}

// =============================================================================
// Workflow discovery
// =============================================================================

#[test]
fn test_workflow_files_sorted_and_filtered() {
    let dir = setup_project("name: flows\n");
    std::fs::write(dir.path().join("workflows/z.alc"), "").unwrap();
    std::fs::write(dir.path().join("workflows/a.alc"), "").unwrap();
    std::fs::write(dir.path().join("workflows/notes.txt"), "").unwrap();

    let config = Config::load(dir.path()).unwrap();
    let files = config.workflow_files().unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.alc", "z.alc"]);
}
