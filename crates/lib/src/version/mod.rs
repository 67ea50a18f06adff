//! Release version bumping.
//!
//! This module provides the core logic for the `distbump bump` command, which
//! computes the next semantic version and rewrites it into Cargo manifests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::DEFAULT_VERSION_MARKER;

/// Which component of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
  Major,
  Minor,
  Patch,
  Prerelease,
}

impl BumpKind {
  pub fn as_str(self) -> &'static str {
    match self {
      BumpKind::Major => "major",
      BumpKind::Minor => "minor",
      BumpKind::Patch => "patch",
      BumpKind::Prerelease => "prerelease",
    }
  }
}

impl fmt::Display for BumpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BumpKind {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "major" => Ok(BumpKind::Major),
      "minor" => Ok(BumpKind::Minor),
      "patch" => Ok(BumpKind::Patch),
      "prerelease" | "pre" => Ok(BumpKind::Prerelease),
      _ => Err(VersionError::UnknownBumpKind { kind: s.to_string() }),
    }
  }
}

#[derive(Debug, Error)]
pub enum VersionError {
  #[error("invalid version '{version}': {source}")]
  Parse { version: String, source: semver::Error },

  #[error("unknown bump kind '{kind}' (expected major, minor, patch or prerelease)")]
  UnknownBumpKind { kind: String },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Toml { path: PathBuf, source: toml::de::Error },

  #[error("no package.version in {}", path.display())]
  MissingVersion { path: PathBuf },
}

/// Compute the version that follows `current`.
///
/// With an explicit `kind` the usual semver increment rules apply, including
/// promotion of a pre-release to its release (`1.2.0-rc.1` + minor is `1.2.0`).
///
/// Without one, a pre-release gets its pre-release counter bumped, and
/// otherwise the patch number is bumped except that a patch of 9 rolls over
/// into the minor number, and a minor of 9 into the major number.
pub fn next_version(current: &str, kind: Option<BumpKind>) -> Result<String, VersionError> {
  let parse_err = |source| VersionError::Parse {
    version: current.to_string(),
    source,
  };
  let mut version = Version::parse(current.trim()).map_err(parse_err)?;

  let kind = kind.unwrap_or(if !version.pre.is_empty() {
    BumpKind::Prerelease
  } else if version.patch == 9 {
    if version.minor == 9 { BumpKind::Major } else { BumpKind::Minor }
  } else {
    BumpKind::Patch
  });

  let was_pre = !version.pre.is_empty();
  match kind {
    BumpKind::Major => {
      if !(was_pre && version.minor == 0 && version.patch == 0) {
        version.major += 1;
      }
      version.minor = 0;
      version.patch = 0;
      version.pre = Prerelease::EMPTY;
    }
    BumpKind::Minor => {
      if !(was_pre && version.patch == 0) {
        version.minor += 1;
      }
      version.patch = 0;
      version.pre = Prerelease::EMPTY;
    }
    BumpKind::Patch => {
      if !was_pre {
        version.patch += 1;
      }
      version.pre = Prerelease::EMPTY;
    }
    BumpKind::Prerelease => {
      let next_pre = if was_pre {
        increment_prerelease(version.pre.as_str())
      } else {
        version.patch += 1;
        "0".to_string()
      };
      version.pre = Prerelease::new(&next_pre).map_err(parse_err)?;
    }
  }
  version.build = BuildMetadata::EMPTY;

  debug!(from = %current, to = %version, kind = %kind, "computed next version");
  Ok(version.to_string())
}

/// Increment the right-most numeric identifier, or append `.0` if there is none.
///
/// `rc.1` -> `rc.2`, `rc.1.beta` -> `rc.2.beta`, `alpha` -> `alpha.0`.
fn increment_prerelease(pre: &str) -> String {
  let mut parts: Vec<String> = pre.split('.').map(str::to_string).collect();
  let numeric = parts
    .iter()
    .enumerate()
    .rev()
    .find_map(|(i, part)| part.parse::<u64>().ok().map(|n| (i, n)));
  match numeric {
    Some((i, n)) => parts[i] = (n + 1).to_string(),
    None => parts.push("0".to_string()),
  }
  parts.join(".")
}

/// Result of bumping one version file.
#[derive(Debug, Clone, Serialize)]
pub struct BumpOutcome {
  pub path: PathBuf,
  pub old_version: String,
  pub new_version: String,
  /// Number of lines rewritten.
  pub lines_changed: usize,
}

/// Options for [`bump_file`].
#[derive(Debug, Clone, Default)]
pub struct BumpOptions {
  pub kind: Option<BumpKind>,
  /// Substrings identifying lines that carry the version. Defaults to `version =`.
  pub markers: Vec<String>,
  /// If true, compute the new version without writing the file.
  pub dry_run: bool,
}

/// Bump the `package.version` of a Cargo manifest.
///
/// The file is edited as text: in every line containing one of the markers,
/// the first occurrence of the old version is replaced. Comments, ordering and
/// formatting elsewhere stay exactly as they were.
pub fn bump_file(path: &Path, options: &BumpOptions) -> Result<BumpOutcome, VersionError> {
  let content = std::fs::read_to_string(path).map_err(|source| VersionError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let table: toml::Table = toml::from_str(&content).map_err(|source| VersionError::Toml {
    path: path.to_path_buf(),
    source,
  })?;
  let old_version = table
    .get("package")
    .and_then(|package| package.get("version"))
    .and_then(|version| version.as_str())
    .ok_or_else(|| VersionError::MissingVersion {
      path: path.to_path_buf(),
    })?
    .to_string();

  let new_version = next_version(&old_version, options.kind)?;

  let default_markers = [DEFAULT_VERSION_MARKER.to_string()];
  let markers = if options.markers.is_empty() {
    &default_markers[..]
  } else {
    &options.markers[..]
  };
  let (updated, lines_changed) = replace_version_lines(&content, markers, &old_version, &new_version);

  if !options.dry_run {
    std::fs::write(path, updated).map_err(|source| VersionError::Write {
      path: path.to_path_buf(),
      source,
    })?;
    info!(path = ?path, from = %old_version, to = %new_version, "bumped version");
  }

  Ok(BumpOutcome {
    path: path.to_path_buf(),
    old_version,
    new_version,
    lines_changed,
  })
}

fn replace_version_lines(content: &str, markers: &[String], old: &str, new: &str) -> (String, usize) {
  let mut changed = 0;
  let lines: Vec<String> = content
    .split('\n')
    .map(|line| {
      if markers.iter().any(|m| line.contains(m.as_str())) && line.contains(old) {
        changed += 1;
        line.replacen(old, new, 1)
      } else {
        line.to_string()
      }
    })
    .collect();
  (lines.join("\n"), changed)
}
