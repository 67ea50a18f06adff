//! Scratch directory for downloaded artifacts.
//!
//! Files are named after the artifact name from the manifest, so a re-run of
//! an interrupted refresh finds earlier downloads and skips the network.
//! Cached files are trusted as-is; a truncated file left by an external tool
//! is not detected.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::util::hash::hash_bytes;

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("failed to create cache directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write cached artifact {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to read cached artifact {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct ArtifactCache {
  dir: PathBuf,
}

impl ArtifactCache {
  /// Open the cache, creating the directory if it does not exist yet.
  pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
    let dir = dir.into();
    fs::create_dir_all(&dir).await.map_err(|source| CacheError::CreateDir {
      path: dir.clone(),
      source,
    })?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Deterministic location of an artifact in the cache.
  pub fn path_for(&self, name: &str) -> PathBuf {
    self.dir.join(cache_file_name(name))
  }

  pub async fn contains(&self, name: &str) -> bool {
    let path = self.path_for(name);
    match fs::try_exists(&path).await {
      Ok(exists) => exists,
      Err(e) => {
        debug!(path = ?path, error = %e, "cannot stat cached artifact, treating as missing");
        false
      }
    }
  }

  /// Store downloaded bytes.
  ///
  /// The bytes land in a sibling `.part` file first and are renamed into
  /// place, so an interrupted write never looks like a cache hit.
  pub async fn store(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, CacheError> {
    let path = self.path_for(name);
    let partial = partial_path(&path);

    fs::write(&partial, bytes).await.map_err(|source| CacheError::Write {
      path: partial.clone(),
      source,
    })?;
    fs::rename(&partial, &path).await.map_err(|source| CacheError::Write {
      path: path.clone(),
      source,
    })?;

    debug!(path = ?path, size = bytes.len(), "cached artifact");
    Ok(path)
  }

  pub async fn read(&self, name: &str) -> Result<Vec<u8>, CacheError> {
    let path = self.path_for(name);
    fs::read(&path).await.map_err(|source| CacheError::Read { path, source })
  }

  /// Remove an artifact and any partial download of it. Missing files are fine.
  pub async fn evict(&self, name: &str) {
    let path = self.path_for(name);
    for candidate in [partial_path(&path), path] {
      match fs::remove_file(&candidate).await {
        Ok(()) => debug!(path = ?candidate, "removed cached file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?candidate, error = %e, "failed to remove cached file"),
      }
    }
  }
}

fn partial_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(PARTIAL_SUFFIX);
  path.with_file_name(name)
}

/// Turn an artifact name into a safe file name.
///
/// Names made only of alphanumerics, dash, underscore and dot are used as-is.
/// Anything else is replaced with `_` and the result gets a short hash of the
/// original name appended, so two different names never share a file. Names
/// that sanitize to nothing usable become `artifact_<hash>`.
fn cache_file_name(name: &str) -> String {
  let sanitized: String = name
    .chars()
    .map(|c| {
      if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
        c
      } else {
        '_'
      }
    })
    .collect();

  let usable = !sanitized.is_empty() && sanitized != "." && sanitized != "..";
  if usable && sanitized == name {
    return sanitized;
  }

  let digest = hash_bytes(name.as_bytes());
  let short = digest.as_str()[..16].to_lowercase();
  if usable {
    format!("{}-{}", sanitized, short)
  } else {
    format!("artifact_{}", short)
  }
}
