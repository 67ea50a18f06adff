//! Refresh command integration tests.
//!
//! Artifacts are seeded into the cache directory, so these tests never reach
//! the network. Records that must fail point at a closed loopback port.

use predicates::prelude::*;

use super::common::{RETAGGED_ARTIFACTS, TestEnv};

#[test]
fn refresh_updates_digests_from_cache() {
  let env = TestEnv::from_fixture("dist.txt");
  let digests = env.seed_all();

  env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", "v1.1.0"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Manifest refreshed!"))
    .stdout(predicate::str::contains("Records updated: 3"))
    .stdout(predicate::str::contains("Records skipped: 1"))
    .stdout(predicate::str::contains("Cache hits: 3"));

  let manifest = env.manifest();
  assert!(!manifest.contains("v1.0.0"));
  assert!(manifest.starts_with("# Prebuilt runtime libraries for v1.1.0\n"));
  for digest in &digests {
    assert!(manifest.contains(digest.as_str()));
  }
  // Column spacing is untouched.
  assert!(manifest.contains(&format!(
    "  {}  {}  true   1\n",
    RETAGGED_ARTIFACTS[1], digests[1]
  )));
  assert!(manifest.contains(&format!(
    "  {}  {}  false  2\n",
    RETAGGED_ARTIFACTS[2], digests[2]
  )));
  assert!(manifest.ends_with("static  x86_64-pc-windows-msvc\n"));
}

#[test]
fn refresh_is_idempotent() {
  let env = TestEnv::from_fixture("dist.txt");
  env.seed_all();

  env.distbump_cmd().args(["refresh", "v1.0.0", "v1.1.0"]).assert().success();
  let first = env.manifest();

  env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", "v1.1.0"])
    .assert()
    .success()
    .stdout(predicate::str::contains("All records are up to date."))
    .stdout(predicate::str::contains("Downloaded: 0"));

  assert_eq!(env.manifest(), first);
}

#[test]
fn refresh_isolates_failed_artifact() {
  let env = TestEnv::with_manifest(
    "\
cpu linux https://example.com/v1.0.0/ok-one.tgz ok-one.tgz AAAA false 1
cpu linux http://127.0.0.1:9/v1.0.0/broken.tgz broken.tgz BBBB false 1
cpu linux https://example.com/v1.0.0/ok-two.tgz ok-two.tgz CCCC false 1
",
  );
  env.seed_artifact("ok-one.tgz", b"one");
  env.seed_artifact("ok-two.tgz", b"two");

  env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", "v1.1.0"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("broken.tgz"))
    .stdout(predicate::str::contains("Records failed: 1"))
    .stdout(predicate::str::contains("Records updated: 2"));

  let manifest = env.manifest();
  assert!(manifest.contains("http://127.0.0.1:9/v1.1.0/broken.tgz broken.tgz BBBB false 1"));
  assert!(!manifest.contains("AAAA"));
  assert!(!manifest.contains("CCCC"));
  assert!(!env.cache_path().join("broken.tgz").exists());
}

#[test]
fn refresh_json_output_is_valid() {
  let env = TestEnv::from_fixture("dist.txt");
  env.seed_all();

  let output = env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", "v1.1.0", "-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(summary["tag_replacements"], 10);
  assert_eq!(summary["updated"].as_array().unwrap().len(), 3);
  assert_eq!(summary["updated"][0]["line"], 4);
  assert_eq!(summary["skipped"], 1);
  assert_eq!(summary["failed"].as_array().unwrap().len(), 0);
}

#[test]
fn refresh_with_explicit_paths() {
  let env = TestEnv::empty();
  env.write_file(
    "release/artifacts.txt",
    "cpu linux https://example.com/v2/app.tgz app.tgz AAAA false 9\n",
  );
  env.write_file("downloads/app.tgz", "app bytes");

  env
    .distbump_cmd()
    .args(["refresh", "v2", "v3", "--manifest", "release/artifacts.txt", "--cache-dir", "downloads"])
    .assert()
    .success();

  let manifest = env.read_file("release/artifacts.txt");
  assert!(manifest.starts_with("cpu linux https://example.com/v3/app.tgz app.tgz "));
  assert!(manifest.ends_with(" false 0\n"));
  assert!(!env.temp.path().join(".tmp").exists());
}

#[test]
fn refresh_with_missing_manifest_fails() {
  let env = TestEnv::empty();

  env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", "v1.1.0"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to refresh"))
    .stderr(predicate::str::contains("failed to read manifest"));
}

#[test]
fn refresh_with_empty_tag_fails_without_touching_manifest() {
  let env = TestEnv::from_fixture("dist.txt");
  let before = env.manifest();

  env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", ""])
    .assert()
    .failure()
    .stderr(predicate::str::contains("new tag must not be empty"));

  assert_eq!(env.manifest(), before);
}

#[test]
fn refresh_parallel_jobs() {
  let env = TestEnv::from_fixture("dist.txt");
  let digests = env.seed_all();

  env
    .distbump_cmd()
    .args(["refresh", "v1.0.0", "v1.1.0", "--jobs", "4"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Records updated: 3"));

  let manifest = env.manifest();
  for digest in &digests {
    assert!(manifest.contains(digest.as_str()));
  }
}
