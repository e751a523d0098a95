//! Integration tests for the `smblinks` binary.
//!
//! Only commands that never reach the network or the mount utility are run
//! here; configuration is isolated through `XDG_CONFIG_HOME`.

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn smblinks(config_home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smblinks"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute smblinks")
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let output = smblinks(&home, &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for command in ["list", "mount", "unmount", "unmount-all", "status", "pick"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
    // Refresh only makes sense inside a long-lived picker session
    assert!(!stdout.contains("refresh"));
}

#[test]
fn test_mount_requires_share_names() {
    let home = TempDir::new().unwrap();
    let output = smblinks(&home, &["mount"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    let output = smblinks(&home, &["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("default_server = (not set, using \"lagrange\")"));
}

#[test]
fn test_config_set_server_persists() {
    let home = TempDir::new().unwrap();

    let output = smblinks(&home, &["config", "set-server", "euler"]);
    assert!(output.status.success());

    let saved = fs::read_to_string(home.path().join("smblinks").join("config.toml")).unwrap();
    assert!(saved.contains("default_server = \"euler\""));

    let output = smblinks(&home, &["--json", "config", "show"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["default_server"], "euler");
}

#[test]
fn test_config_reset() {
    let home = TempDir::new().unwrap();
    smblinks(&home, &["config", "set-fallback", "docs", "media"]);

    let output = smblinks(&home, &["config", "reset"]);
    assert!(output.status.success());

    let output = smblinks(&home, &["--json", "config", "show"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({}));
}

#[test]
fn test_status_with_empty_links_dir() {
    let home = TempDir::new().unwrap();
    let links = home.path().join("links");
    let config_dir = home.path().join("smblinks");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("links_dir = {:?}\n", links.display().to_string()),
    )
    .unwrap();

    let output = smblinks(&home, &["--json", "status"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(value, serde_json::json!({"links": []}));
}

#[test]
fn test_invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("smblinks");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "default_server = [").unwrap();

    let output = smblinks(&home, &["status"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to load configuration"));
}
