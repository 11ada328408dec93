//! Integration tests for the JSON-printing commands.
//!
//! These tests verify:
//! - `config` prints the resolved configuration as valid JSON
//! - Build and serve resolve different bases
//! - `inputs` and `properties` print discovered project data
//! - Configuration errors exit non-zero

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "javite-cli", "--bin", "javite", "--"]);
    cmd
}

fn run_json(args: &[&str], cwd: &std::path::Path) -> serde_json::Value {
    let output = cargo_bin()
        .args(args)
        .arg("--cwd")
        .arg(cwd)
        .env_remove("ASSET_URL")
        .env_remove("VITE_PORT")
        .output()
        .expect("Failed to run javite");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "javite {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_config_build_uses_build_directory() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("javite.config.json"),
        r#"{ "java": { "input": ["src/main.ts"], "buildDirectory": "static/build" } }"#,
    )
    .unwrap();

    let json = run_json(&["config", "--command", "build"], dir.path());

    assert_eq!(json["plugins"], serde_json::json!(["javite"]));
    assert_eq!(json["config"]["base"], "/static/build/");
    assert_eq!(json["config"]["build"]["manifest"], ".vite/manifest.json");
    assert_eq!(json["config"]["build"]["assetsInlineLimit"], 0);
    assert!(json["configFile"]
        .as_str()
        .unwrap()
        .ends_with("javite.config.json"));
}

#[test]
fn test_config_serve_has_empty_base_and_strict_port() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("javite.config.json"),
        r#"{ "java": "src/main.ts" }"#,
    )
    .unwrap();

    let json = run_json(&["config", "--command", "serve"], dir.path());

    assert_eq!(json["config"]["command"], "serve");
    assert_eq!(json["config"]["mode"], "development");
    assert_eq!(json["config"]["base"], "");
    assert_eq!(json["config"]["server"]["strictPort"], true);
    assert_eq!(json["config"]["server"]["port"], 5173);
}

#[test]
fn test_config_asset_url_from_env_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "ASSET_URL=https://cdn.example.com\n").unwrap();
    std::fs::write(
        dir.path().join("javite.config.json"),
        r#"{ "java": "src/main.ts" }"#,
    )
    .unwrap();

    let json = run_json(&["config"], dir.path());
    assert_eq!(json["config"]["base"], "https://cdn.example.com/build/");
}

#[test]
fn test_config_without_input_fails() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .args(["config", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run javite");

    assert!(!output.status.success());
}

#[test]
fn test_inputs_discovers_main_entries() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/admin")).unwrap();
    std::fs::write(dir.path().join("src/main.ts"), "").unwrap();
    std::fs::write(dir.path().join("src/admin/main.ts"), "").unwrap();

    let json = run_json(&["inputs"], dir.path());
    let inputs = json.as_object().unwrap();

    assert_eq!(inputs.len(), 2);
    assert!(inputs["main"].as_str().unwrap().ends_with("main.ts"));
    assert!(inputs["admin/main"].as_str().unwrap().ends_with("main.ts"));
}

#[test]
fn test_properties_merges_files() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(
        dir.path().join("config/application.properties"),
        "# server\nserver.port=8080\napp.name = shop\n",
    )
    .unwrap();

    let json = run_json(&["properties"], dir.path());

    assert_eq!(json["server.port"], "8080");
    assert_eq!(json["app.name"], "shop");
}

#[test]
fn test_version_prints_plugin_version() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .args(["version", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run javite");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("javite"));
}
