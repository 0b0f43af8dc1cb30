//! CLI interface end-to-end tests.
//!
//! Exercises the `hedl` binary itself, not just the command handlers, so
//! that argument parsing, process exit codes, and file I/O are covered.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hedl_bin() -> Command {
    Command::cargo_bin("hedl").unwrap()
}

#[test]
fn cli_help_lists_subcommands() {
    hedl_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check").and(predicate::str::contains("convert")));
}

#[test]
fn cli_version_reports_the_package_version() {
    hedl_bin().arg("--version").assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_init_then_check_round_trips_a_document() {
    let dir = TempDir::new().unwrap();
    hedl_bin().arg("init").arg("--path").arg(dir.path()).assert().success();

    hedl_bin().arg("check").arg(dir.path().join("example.hedl")).assert().success();
}

#[test]
fn cli_check_reports_a_strict_failure_and_a_nonzero_exit_code() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("broken.hedl");
    std::fs::write(&doc, "%VERSION: 1.0\n---\nref: @missing\n").unwrap();

    hedl_bin().arg("check").arg(&doc).assert().failure();
}

#[test]
fn cli_convert_renders_json_to_stdout() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("doc.hedl");
    std::fs::write(&doc, "%VERSION: 1.0\n---\nname: Alice\n").unwrap();

    hedl_bin()
        .arg("convert")
        .arg(&doc)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"));
}

#[test]
fn cli_fmt_check_fails_on_non_canonical_document() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("doc.hedl");
    std::fs::write(&doc, "%VERSION: 1.0\n%SCHEMA: B { x: int }\n%SCHEMA: A { y: int }\n---\nk: 1\n").unwrap();

    hedl_bin().arg("fmt").arg(&doc).arg("--check").assert().failure();
}
