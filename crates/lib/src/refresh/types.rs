//! Types for the digest refresh run.
//!
//! This module defines the options, per-record results, summary and error
//! types used by [`super::refresh`].

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;
use crate::fetch::FetchError;
use crate::util::hash::{ContentHash, hash_bytes, size_in_mb};

/// Inputs for a refresh run.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
  /// Manifest file rewritten in place.
  pub manifest_path: PathBuf,
  /// Scratch directory for downloaded artifacts.
  pub cache_dir: PathBuf,
  /// Tag currently referenced by the manifest.
  pub current_tag: String,
  /// Tag the manifest should point at afterwards.
  pub new_tag: String,
  /// Maximum number of artifacts fetched and hashed at the same time.
  pub jobs: usize,
}

impl RefreshOptions {
  pub fn new(
    manifest_path: impl Into<PathBuf>,
    cache_dir: impl Into<PathBuf>,
    current_tag: impl Into<String>,
    new_tag: impl Into<String>,
  ) -> Self {
    Self {
      manifest_path: manifest_path.into(),
      cache_dir: cache_dir.into(),
      current_tag: current_tag.into(),
      new_tag: new_tag.into(),
      jobs: 1,
    }
  }

  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }
}

/// Fatal errors. Anything that goes wrong for a single artifact is a
/// [`RecordError`] instead and never aborts the run.
#[derive(Debug, Error)]
pub enum RefreshError {
  /// A required tag argument was empty.
  #[error("{which} tag must not be empty")]
  MissingTag { which: &'static str },

  #[error(transparent)]
  Cache(#[from] CacheError),

  #[error("failed to read manifest {}: {source}", path.display())]
  ReadManifest { path: PathBuf, source: io::Error },

  #[error("failed to write manifest {}: {source}", path.display())]
  WriteManifest { path: PathBuf, source: io::Error },
}

/// Why a single record could not be refreshed.
#[derive(Debug, Error)]
pub enum RecordError {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Cache(#[from] CacheError),

  /// The worker task died before reporting a result.
  #[error("worker task failed: {0}")]
  Task(String),
}

/// Digest and size computed from the bytes of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFetchResult {
  pub byte_len: u64,
  pub digest: ContentHash,
  pub size_mb: u64,
  /// Bytes came from the cache rather than the network.
  pub cache_hit: bool,
}

impl ArtifactFetchResult {
  pub fn from_bytes(bytes: &[u8], cache_hit: bool) -> Self {
    let byte_len = bytes.len() as u64;
    Self {
      byte_len,
      digest: hash_bytes(bytes),
      size_mb: size_in_mb(byte_len),
      cache_hit,
    }
  }
}

/// A record whose digest and size were rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedRecord {
  /// One-based line number in the manifest.
  pub line: usize,
  pub name: String,
  pub digest: String,
  pub size_mb: u64,
}

/// A record that could not be refreshed and keeps its previous values.
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
  /// One-based line number in the manifest.
  pub line: usize,
  pub name: String,
  pub url: String,
  pub error: String,
}

/// Outcome of a refresh run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshSummary {
  pub manifest: PathBuf,
  /// Occurrences of the current tag replaced in the manifest text.
  pub tag_replacements: usize,
  /// Non-comment, non-blank lines looked at.
  pub considered: usize,
  /// Records whose digest or size changed.
  pub updated: Vec<UpdatedRecord>,
  /// Records processed successfully whose values were already current.
  pub unchanged: Vec<String>,
  /// Lines missing a url, name or digest.
  pub skipped: usize,
  pub failed: Vec<RecordFailure>,
  pub cache_hits: usize,
  pub fetched: usize,
}

impl RefreshSummary {
  pub fn has_failures(&self) -> bool {
    !self.failed.is_empty()
  }
}
