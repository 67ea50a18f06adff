use std::path::{Path, PathBuf};

use crate::consts::{CACHE_DIR_NAME, DEFAULT_MANIFEST_PATH};

/// Overrides the project root (default: current directory).
pub const ROOT_ENV: &str = "DISTBUMP_ROOT";
/// Overrides the manifest location.
pub const MANIFEST_ENV: &str = "DISTBUMP_MANIFEST";
/// Overrides the artifact cache directory.
pub const CACHE_DIR_ENV: &str = "DISTBUMP_CACHE_DIR";

fn env_path(var: &str) -> Option<PathBuf> {
  std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the project root that relative defaults are resolved against.
pub fn project_root() -> PathBuf {
  let root = env_path(ROOT_ENV)
    .or_else(|| std::env::current_dir().ok())
    .unwrap_or_else(|| PathBuf::from("."));
  dunce::canonicalize(&root).unwrap_or(root)
}

/// Returns the manifest path: `$DISTBUMP_MANIFEST`, else `<root>/sys/dist.txt`.
pub fn manifest_path(root: &Path) -> PathBuf {
  env_path(MANIFEST_ENV).unwrap_or_else(|| root.join(DEFAULT_MANIFEST_PATH))
}

/// Returns the artifact cache directory: `$DISTBUMP_CACHE_DIR`, else `<root>/.tmp`.
pub fn cache_dir(root: &Path) -> PathBuf {
  env_path(CACHE_DIR_ENV).unwrap_or_else(|| root.join(CACHE_DIR_NAME))
}
