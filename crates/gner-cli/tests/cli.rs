//! Smoke tests for the gner binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_commands() {
    Command::cargo_bin("gner")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn run_fails_cleanly_without_a_model() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("gner")
        .unwrap()
        .current_dir(dir.path())
        .args(["run", "sample_0"])
        .assert()
        .failure();
}

#[test]
fn batch_fails_cleanly_on_an_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("gner")
        .unwrap()
        .current_dir(dir.path())
        .args(["batch", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No samples found"));
}

#[test]
fn config_init_writes_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gner.json");

    Command::cargo_bin("gner")
        .unwrap()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("model_path"));
}
