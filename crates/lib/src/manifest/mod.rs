//! Artifact manifest model.
//!
//! The manifest (`sys/dist.txt`) is a line-oriented text file. Lines starting
//! with `#` are comments, blank lines separate groups, and every other line is
//! an artifact record with whitespace-separated columns:
//!
//! ```text
//! features arch url name digest dynamic size_mb
//! ```
//!
//! The file is treated as text rather than a schema: parsing never fails,
//! unrecognized lines are kept verbatim, and edits replace located substrings
//! so that column alignment and comments survive untouched.

mod types;

use std::fmt;

pub use types::*;

/// The whole manifest as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistManifest {
  lines: Vec<ManifestLine>,
}

impl DistManifest {
  /// Parse manifest text. Never fails; malformed lines are a classification.
  pub fn parse(text: &str) -> Self {
    let lines = text.split_inclusive('\n').map(ManifestLine::from_chunk).collect();
    Self { lines }
  }

  /// Render the manifest back to text using each line's original terminator.
  pub fn serialize(&self) -> String {
    let mut out = String::with_capacity(self.lines.iter().map(|l| l.raw().len() + 2).sum());
    for line in &self.lines {
      out.push_str(line.raw());
      out.push_str(line.ending().as_str());
    }
    out
  }

  pub fn lines(&self) -> &[ManifestLine] {
    &self.lines
  }

  pub fn line_mut(&mut self, index: usize) -> Option<&mut ManifestLine> {
    self.lines.get_mut(index)
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Iterate over record lines as `(line_index, record)`.
  pub fn records(&self) -> impl Iterator<Item = (usize, &Record)> {
    self
      .lines
      .iter()
      .enumerate()
      .filter_map(|(idx, line)| line.record().map(|record| (idx, record)))
  }
}

impl fmt::Display for DistManifest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.serialize())
  }
}

pub fn parse(text: &str) -> DistManifest {
  DistManifest::parse(text)
}

pub fn serialize(manifest: &DistManifest) -> String {
  manifest.serialize()
}

/// Replace the first textual occurrence of `old` within a single line.
pub fn replace_field(line: &ManifestLine, old: &str, new: &str) -> ManifestLine {
  let mut updated = line.clone();
  updated.replace_text(old, new);
  updated
}

/// Replace every literal occurrence of `current` with `new` across the whole text.
///
/// Returns the rewritten text and the number of replacements made.
pub fn substitute_tag(text: &str, current: &str, new: &str) -> (String, usize) {
  if current.is_empty() {
    return (text.to_string(), 0);
  }
  let count = text.matches(current).count();
  (text.replace(current, new), count)
}
