//! End-to-end tests for the `fieldscan` binary.

use assert_cmd::Command;
use image::{DynamicImage, RgbImage};
use predicates::prelude::*;

fn fieldscan() -> Command {
    Command::cargo_bin("fieldscan").unwrap()
}

#[test]
fn test_config_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8080"));

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "server.port", "9100"])
        .assert()
        .success();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9100"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "server.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_set_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "server.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    assert_eq!(std::fs::read_to_string(&config).unwrap(), "{}");
}

#[test]
fn test_config_init_force_replaces_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8080"));
}

#[test]
fn test_corrupt_config_rejected_by_readers() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn test_log_dir_writes_rolling_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let log_dir = dir.path().join("logs");
    let contents = serde_json::json!({ "server": { "log_dir": log_dir } });
    std::fs::write(&config, contents.to_string()).unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .arg("scan")
        .arg(dir.path().join("nope.png"))
        .assert()
        .failure();

    let names: Vec<String> = std::fs::read_dir(&log_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        names.iter().any(|name| name.starts_with("fieldscan.log")),
        "no log file in {:?}",
        names
    );
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    fieldscan()
        .arg("--config")
        .arg(dir.path().join("missing.json"))
        .arg("scan")
        .arg(dir.path().join("image.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_scan_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .arg("scan")
        .arg(dir.path().join("nope.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_scan_without_models() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();

    let image_path = dir.path().join("blank.png");
    DynamicImage::ImageRgb8(RgbImage::new(8, 8))
        .save(&image_path)
        .unwrap();

    fieldscan()
        .arg("--config")
        .arg(&config)
        .arg("scan")
        .arg(&image_path)
        .arg("--model-dir")
        .arg(dir.path().join("no-models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to initialise OCR engine"));
}
