//! Integration tests for the `poolside` CLI binary.
//!
//! These tests validate argument parsing, help output, shell
//! completions, local validation, and error handling — all without a
//! live cloud account.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `poolside` binary with env isolation.
///
/// Clears all `POOLSIDE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real
/// configuration.
fn poolside_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("poolside");
    cmd.env("HOME", "/tmp/poolside-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/poolside-cli-test-nonexistent")
        .env_remove("POOLSIDE_PROFILE")
        .env_remove("POOLSIDE_USERNAME")
        .env_remove("POOLSIDE_PASSWORD")
        .env_remove("POOLSIDE_OUTPUT")
        .env_remove("POOLSIDE_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = poolside_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    poolside_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("pool equipment")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("climate"))
            .and(predicate::str::contains("entities")),
    );
}

#[test]
fn test_version_flag() {
    poolside_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("poolside"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    poolside_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    poolside_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("poolside"));
}

// ── Config commands (no network) ────────────────────────────────────

#[test]
fn test_config_path_prints_a_path() {
    poolside_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_with_no_file_prints_defaults() {
    poolside_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

// ── Climate modes (static, no network) ──────────────────────────────

#[test]
fn test_climate_modes_lists_all_presets() {
    poolside_cmd()
        .args(["climate", "modes"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Smart Heating/Cooling")
                .and(predicate::str::contains("Boost Heating"))
                .and(predicate::str::contains("Silence Cooling"))
                .and(predicate::str::contains("Off")),
        );
}

// ── Local validation (fails before any network use) ─────────────────

#[test]
fn test_set_temp_rejects_out_of_range_before_connecting() {
    let output = poolside_cmd()
        .args(["climate", "set-temp", "LX-1", "41.0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("outside the accepted range"), "{text}");
}

#[test]
fn test_set_temp_rejects_off_increment_before_connecting() {
    let output = poolside_cmd()
        .args(["climate", "set-temp", "LX-1", "28.3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("not a multiple"), "{text}");
}

#[test]
fn test_set_mode_rejects_unknown_preset() {
    let output = poolside_cmd()
        .args(["climate", "set-mode", "LX-1", "Turbo Heating"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("not a preset"), "{text}");
}

// ── Missing credentials ─────────────────────────────────────────────

#[test]
fn test_devices_without_credentials_fails_with_guidance() {
    let output = poolside_cmd().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(78));
    let text = combined_output(&output);
    assert!(
        text.contains("POOLSIDE_USERNAME") || text.contains("set-credentials"),
        "{text}"
    );
}

#[test]
fn test_unknown_subcommand_fails() {
    poolside_cmd().arg("frobnicate").assert().failure();
}
