//! Bump command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const CARGO_TOML: &str = r#"[package]
name = "runtime-rs"
version = "0.6.8"
edition = "2021"

[dependencies]
runtime-rs-sys = { path = "sys", version = "0.6.8", default-features = false }
"#;

const SYS_CARGO_TOML: &str = r#"[package]
name = "runtime-rs-sys"
version = "0.6.8"
edition = "2021"
"#;

#[test]
fn bump_defaults_to_root_cargo_toml() {
  let env = TestEnv::empty();
  env.write_file("Cargo.toml", CARGO_TOML);

  env
    .distbump_cmd()
    .arg("bump")
    .assert()
    .success()
    .stdout(predicate::str::contains("Bumped"))
    .stdout(predicate::str::contains("0.6.9"));

  let content = env.read_file("Cargo.toml");
  assert!(content.contains("version = \"0.6.9\"\nedition"));
  assert!(content.contains("runtime-rs-sys = { path = \"sys\", version = \"0.6.9\", default-features = false }"));
}

#[test]
fn bump_multiple_files_with_kind() {
  let env = TestEnv::empty();
  env.write_file("Cargo.toml", CARGO_TOML);
  env.write_file("sys/Cargo.toml", SYS_CARGO_TOML);

  env
    .distbump_cmd()
    .args(["bump", "minor", "--file", "Cargo.toml", "--file", "sys/Cargo.toml"])
    .assert()
    .success();

  assert!(env.read_file("Cargo.toml").contains("version = \"0.7.0\""));
  assert!(env.read_file("sys/Cargo.toml").contains("version = \"0.7.0\""));
}

#[test]
fn bump_dry_run_writes_nothing() {
  let env = TestEnv::empty();
  env.write_file("Cargo.toml", CARGO_TOML);

  env
    .distbump_cmd()
    .args(["bump", "major", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Dry run"))
    .stdout(predicate::str::contains("1.0.0"));

  assert_eq!(env.read_file("Cargo.toml"), CARGO_TOML);
}

#[test]
fn bump_json_output() {
  let env = TestEnv::empty();
  env.write_file("Cargo.toml", CARGO_TOML);

  env
    .distbump_cmd()
    .args(["bump", "prerelease", "-o", "json", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"old_version\": \"0.6.8\""))
    .stdout(predicate::str::contains("\"new_version\": \"0.6.9-0\""));
}

#[test]
fn bump_rejects_unknown_kind() {
  let env = TestEnv::empty();
  env.write_file("Cargo.toml", CARGO_TOML);

  env.distbump_cmd().args(["bump", "huge"]).assert().failure();

  assert_eq!(env.read_file("Cargo.toml"), CARGO_TOML);
}

#[test]
fn bump_missing_file_fails() {
  let env = TestEnv::empty();

  env
    .distbump_cmd()
    .arg("bump")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to bump"));
}
