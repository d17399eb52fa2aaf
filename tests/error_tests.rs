//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn mp3_recorder_bin(config_home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mp3-recorder").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path());
    cmd
}

#[test]
fn config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    mp3_recorder_bin(&dir)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    mp3_recorder_bin(&dir)
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_set_invalid_duration() {
    let dir = tempfile::tempdir().unwrap();
    mp3_recorder_bin(&dir)
        .args(["config", "set", "duration", "invalid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn config_set_invalid_boolean() {
    let dir = tempfile::tempdir().unwrap();
    mp3_recorder_bin(&dir)
        .args(["config", "set", "debug", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("true").and(predicate::str::contains("false")));
}

#[test]
fn config_list_with_no_file() {
    let dir = tempfile::tempdir().unwrap();
    mp3_recorder_bin(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not set"));
}

#[test]
fn broken_config_file_is_ignored_for_recording_options() {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("mp3-recorder");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), "duration = [").unwrap();

    // Falls back to defaults, so the CLI flag is what gets validated
    mp3_recorder_bin(&dir)
        .args(["--duration", "nope"])
        .assert()
        .code(2);
}

#[test]
fn worker_rejects_garbage_without_exiting_early() {
    let dir = tempfile::tempdir().unwrap();
    mp3_recorder_bin(&dir)
        .arg("worker")
        .write_stdin("not json\n{\"cmd\":\"finish\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid request"))
        .stdout(predicate::str::contains("finish received before init"));
}
