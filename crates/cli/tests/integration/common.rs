//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Uppercase hex SHA-256, as written into the manifest.
pub fn sha256_upper(bytes: &[u8]) -> String {
  hex::encode_upper(Sha256::digest(bytes))
}

/// Artifact names of `dist.txt` after re-tagging to v1.1.0.
pub const RETAGGED_ARTIFACTS: [&str; 3] = [
  "runtime-v1.1.0-linux-x64-static.tar.bz2",
  "runtime-v1.1.0-linux-x64-shared.tar.bz2",
  "runtime-v1.1.0-osx-universal2-static.tar.bz2",
];

/// Isolated test environment.
///
/// Each test gets its own project root with `sys/dist.txt` and a `.tmp` cache.
pub struct TestEnv {
  pub temp: TempDir,
  pub manifest_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file copied to `sys/dist.txt`.
  pub fn from_fixture(name: &str) -> Self {
    Self::with_manifest(&fixture_content(name))
  }

  /// Create with the given manifest text.
  pub fn with_manifest(content: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join("sys").join("dist.txt");
    std::fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
    std::fs::write(&manifest_path, content).unwrap();
    Self { temp, manifest_path }
  }

  /// Create an empty test environment.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join("sys").join("dist.txt");
    Self { temp, manifest_path }
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.temp.path().join(relative_path)).unwrap()
  }

  pub fn manifest(&self) -> String {
    std::fs::read_to_string(&self.manifest_path).unwrap()
  }

  /// Cache path for downloads.
  pub fn cache_path(&self) -> PathBuf {
    let p = self.temp.path().join(".tmp");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Put an artifact into the cache so no download is needed.
  pub fn seed_artifact(&self, name: &str, bytes: &[u8]) {
    std::fs::write(self.cache_path().join(name), bytes).unwrap();
  }

  /// Seed every artifact of `dist.txt` with distinct contents; returns their digests.
  pub fn seed_all(&self) -> Vec<String> {
    RETAGGED_ARTIFACTS
      .iter()
      .enumerate()
      .map(|(i, name)| {
        let bytes = vec![i as u8 + 1; (i + 1) * 700_000];
        self.seed_artifact(name, &bytes);
        sha256_upper(&bytes)
      })
      .collect()
  }

  /// Get a pre-configured Command for the distbump binary.
  ///
  /// Runs from the project root with `DISTBUMP_ROOT` pointing at it, path
  /// overrides cleared and proxies disabled so nothing leaves the machine.
  pub fn distbump_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("distbump");
    cmd.current_dir(self.temp.path());
    cmd.env("DISTBUMP_ROOT", self.temp.path());
    cmd.env_remove("DISTBUMP_MANIFEST");
    cmd.env_remove("DISTBUMP_CACHE_DIR");
    for var in ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY", "http_proxy", "https_proxy", "all_proxy"] {
      cmd.env_remove(var);
    }
    cmd.env("NO_PROXY", "*");
    cmd
  }
}
