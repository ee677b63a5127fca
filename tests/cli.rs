//! CLI Contract Tests
//!
//! Exit codes: 0 valid, 2 invalid, 1 on I/O, parse or config errors.

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output};

fn cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_avatardef-cli"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run avatardef-cli")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn invariant_cli_valid_definition_exits_zero() {
    let output = cli(&[
        "definition",
        "--payload",
        r#"{"body": {"content": [], "width": 10, "height": 10}}"#,
    ]);
    assert_eq!(output.status.code(), Some(0));
    let report = stdout_json(&output);
    assert_eq!(report["valid"], true);
    assert_eq!(report["subject"], "definition");
}

#[test]
fn invariant_cli_invalid_options_exits_two() {
    let output = cli(&["options", "--payload", r#"{"headRotation": [-361, 30]}"#]);
    assert_eq!(output.status.code(), Some(2));
    let report = stdout_json(&output);
    assert_eq!(report["valid"], false);
    assert_eq!(report["violations"][0]["path"], "/headRotation/0");
    assert_eq!(report["violations"][0]["code"], "out_of_range");
    assert_eq!(report["violations"][0]["kind"], "structural");
}

#[test]
fn invariant_cli_reads_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"seed": "felix", "size": 64}}"#).unwrap();
    let path = file.path().to_str().unwrap();

    let output = cli(&["options", "--file", path]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn invariant_cli_config_limits_apply() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("limits.json");
    std::fs::write(&config, r#"{"maxDepth": 1}"#).unwrap();

    let output = cli(&[
        "--config",
        config.to_str().unwrap(),
        "definition",
        "--payload",
        r#"{"body": {"content": [{"type": "element", "name": "g", "children": [{"type": "text"}]}], "width": 1, "height": 1}}"#,
    ]);
    assert_eq!(output.status.code(), Some(2));
    let report = stdout_json(&output);
    assert_eq!(report["violations"][0]["code"], "resource_limit_exceeded");
}

#[test]
fn invariant_cli_bad_input_exits_one() {
    let output = cli(&["definition", "--payload", "{not json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_json(&output)["error"].as_str().unwrap().contains("Invalid JSON"));

    let output = cli(&["definition", "--file", "/nonexistent/avatar.json"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn invariant_cli_bad_config_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("limits.json");
    std::fs::write(&config, r#"{"maxDepth": 0}"#).unwrap();

    let output = cli(&["--config", config.to_str().unwrap(), "options", "--payload", "{}"]);
    assert_eq!(output.status.code(), Some(1));
}
