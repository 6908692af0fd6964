use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::Path;

fn init_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("alchemy")
        .args(["init", dir.path().to_str().unwrap(), "--name", "demo"])
        .assert()
        .success();
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// =============================================================================
// init
// =============================================================================

#[test]
fn test_init_creates_project() {
    let dir = init_project();

    assert!(dir.path().join("alchemy.yaml").exists());
    assert!(dir.path().join("workflows/example.alc").exists());
    assert!(dir.path().join("nodes/threshold.yaml").exists());

    let config = fs::read_to_string(dir.path().join("alchemy.yaml")).unwrap();
    assert!(config.contains("name: \"demo\""));
}

#[test]
fn test_init_refuses_existing_project() {
    let dir = init_project();

    cargo_bin_cmd!("alchemy")
        .args(["init", path_str(dir.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already contains an alchemy.yaml"));
}

// =============================================================================
// compile
// =============================================================================

#[test]
fn test_compile_example_to_stdout() {
    let dir = init_project();
    let source = dir.path().join("workflows/example.alc");

    let assert = cargo_bin_cmd!("alchemy")
        .args(["--config", path_str(dir.path())])
        .args(["compile", path_str(&source)])
        .assert()
        .success();

    let graph: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(graph["edges"].as_array().unwrap().len(), 2);
    assert_eq!(graph["nodes"][1]["type"], "Blur");
    assert_eq!(graph["edges"][0]["sourceHandle"], "image");
    assert!(graph.get("errors").is_none());
}

#[test]
fn test_compile_to_output_file() {
    let dir = init_project();
    let source = dir.path().join("workflows/example.alc");
    let output = dir.path().join("example.json");

    cargo_bin_cmd!("alchemy")
        .args(["--config", path_str(dir.path())])
        .args(["compile", path_str(&source), "--pretty", "--output"])
        .arg(path_str(&output))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\n  \"nodes\""));
}

#[test]
fn test_compile_uses_project_library() {
    let dir = init_project();
    let source = dir.path().join("workflows/legacy.alc");
    fs::write(&source, "img = Threshold(level = 90)\nout = Threshold(img)\n").unwrap();

    let assert = cargo_bin_cmd!("alchemy")
        .args(["--config", path_str(dir.path())])
        .args(["compile", path_str(&source)])
        .assert()
        .success();

    let graph: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(graph["nodes"][0]["data"]["label"], "img");
    assert_eq!(graph["nodes"][0]["data"]["parameters"]["level"], 90);
    assert_eq!(graph["nodes"][1]["data"]["parameters"]["level"], 128);
    assert_eq!(graph["edges"][0]["targetHandle"], "in");
}

#[test]
fn test_compile_failure_reports_location() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("broken.alc");
    fs::write(&source, "workspace {\n  node Blur inputs { }\n}\n").unwrap();

    let assert = cargo_bin_cmd!("alchemy")
        .args(["compile", path_str(&source)])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!(
            "{}:2:13: expected '{{' after node name",
            path_str(&source)
        )));

    let graph: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert!(graph["nodes"].as_array().unwrap().is_empty());
    assert_eq!(graph["errors"][0]["line"], 2);
}

#[test]
fn test_compile_missing_file() {
    cargo_bin_cmd!("alchemy")
        .args(["compile", "no-such-file.alc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read no-such-file.alc"));
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn test_validate_project_workflows() {
    let dir = init_project();

    cargo_bin_cmd!("alchemy")
        .args(["--config", path_str(dir.path())])
        .args(["validate", path_str(&dir.path().join("workflows"))])
        .assert()
        .success();
}

#[rstest]
#[case("node Orphan { }", "no workspace block found")]
#[case("workspace { node A { } }\nconnections { A.out -> B.in }", ":2:24: node not found: B")]
#[case("workspace {\n  node Blur {\n", ":3:1: expected")]
fn test_validate_reports_errors(#[case] source: &str, #[case] expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.alc"), "workspace { node Fine { } }").unwrap();
    fs::write(dir.path().join("bad.alc"), source).unwrap();

    cargo_bin_cmd!("alchemy")
        .args(["validate", path_str(dir.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.alc"))
        .stderr(predicate::str::contains(expected))
        .stderr(predicate::str::contains("1 of 2 file(s) failed validation"));
}

// =============================================================================
// nodes
// =============================================================================

#[test]
fn test_nodes_list_includes_library() {
    let dir = init_project();

    cargo_bin_cmd!("alchemy")
        .args(["--config", path_str(dir.path()), "nodes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test-node"))
        .stdout(predicate::str::contains("empty-node"))
        .stdout(predicate::str::contains("Threshold"));
}

#[test]
fn test_nodes_list_by_category() {
    cargo_bin_cmd!("alchemy")
        .args(["nodes", "list", "--category", "basic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty-node"))
        .stdout(predicate::str::contains("test-node").not());
}

#[test]
fn test_nodes_show() {
    let assert = cargo_bin_cmd!("alchemy")
        .args(["nodes", "show", "test-node"])
        .assert()
        .success();

    let definition: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(definition["type"], "test-node");
    assert_eq!(definition["parameters"][1]["defaultValue"], 42);
}

#[test]
fn test_nodes_show_unknown() {
    cargo_bin_cmd!("alchemy")
        .args(["nodes", "show", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown node type: Ghost"));
}
