//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: a graph was produced (cycles and warnings included)
//! - Exit code 1: the scan failed, or `--fail-on-cycle` found a cycle
//! - Exit code 2: invalid command-line usage (handled by clap)

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("kustomap");
    cmd.arg("--help").assert().code(0);
}

#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("kustomap");
    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("kustomap"));
}

#[test]
fn test_exit_code_missing_directory() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["scan", "does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Directory not found"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_exit_code_no_manifests() {
    let fixture = TestFixture::new().with_file("README.md", "# nothing here");

    fixture
        .command()
        .arg("scan")
        .arg(fixture.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No kustomization manifest found"));
}

#[test]
fn test_exit_code_unrecognized_url() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["scan", "https://bitbucket.org/acme/infra/src/main"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unrecognized source"));
}

#[test]
fn test_exit_code_invalid_settings_file() {
    let fixture = TestFixture::new()
        .with_layout(layouts::BASE_AND_OVERLAYS)
        .with_file("settings.yaml", "retry: [not, a, mapping]\n");

    fixture
        .command()
        .arg("--config")
        .arg(fixture.path().join("settings.yaml"))
        .arg("scan")
        .arg(fixture.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration parsing error"));
}

#[test]
fn test_exit_code_unknown_format() {
    let fixture = TestFixture::new().with_layout(layouts::BASE_AND_OVERLAYS);

    fixture
        .command()
        .args(["scan", "--format", "dot"])
        .arg(fixture.path())
        .assert()
        .code(2);
}
