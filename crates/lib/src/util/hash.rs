//! Digest and size helpers for artifact verification.
//!
//! Manifest digests are full SHA-256 hashes rendered as uppercase hex, and
//! sizes are whole megabytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::BYTES_PER_MB;

/// A full 64-character SHA-256 hash of artifact bytes.
///
/// # Format
///
/// Uppercase hexadecimal, matching the digest column of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode_upper(hasher.finalize()))
}

/// Size in whole megabytes, rounded to the nearest integer.
pub fn size_in_mb(len: u64) -> u64 {
  (len as f64 / BYTES_PER_MB as f64).round() as u64
}
