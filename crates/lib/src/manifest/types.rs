//! Line and record types for the artifact manifest.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Positional fields of an artifact record, in manifest column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
  Features,
  Arch,
  Url,
  Name,
  Digest,
  DynamicFlag,
  SizeMb,
}

impl Field {
  /// Zero-based column of this field.
  pub fn column(self) -> usize {
    match self {
      Field::Features => 0,
      Field::Arch => 1,
      Field::Url => 2,
      Field::Name => 3,
      Field::Digest => 4,
      Field::DynamicFlag => 5,
      Field::SizeMb => 6,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Field::Features => "features",
      Field::Arch => "arch",
      Field::Url => "url",
      Field::Name => "name",
      Field::Digest => "digest",
      Field::DynamicFlag => "dynamic",
      Field::SizeMb => "size_mb",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One whitespace-separated token of a record line and its byte range in the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub value: String,
  pub span: Range<usize>,
}

/// A line that parsed as an artifact record.
///
/// Tokens beyond the seventh column are kept but never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
  tokens: Vec<Token>,
}

impl Record {
  pub(crate) fn tokenize(raw: &str) -> Self {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in raw.char_indices() {
      match (ch.is_whitespace(), start) {
        (true, Some(s)) => {
          tokens.push(Token {
            value: raw[s..idx].to_string(),
            span: s..idx,
          });
          start = None;
        }
        (false, None) => start = Some(idx),
        _ => {}
      }
    }
    if let Some(s) = start {
      tokens.push(Token {
        value: raw[s..].to_string(),
        span: s..raw.len(),
      });
    }

    Self { tokens }
  }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.tokens.get(field.column()).map(|t| t.value.as_str())
  }

  pub fn span(&self, field: Field) -> Option<Range<usize>> {
    self.tokens.get(field.column()).map(|t| t.span.clone())
  }

  pub fn tokens(&self) -> &[Token] {
    &self.tokens
  }

  pub fn url(&self) -> Option<&str> {
    self.get(Field::Url)
  }

  pub fn name(&self) -> Option<&str> {
    self.get(Field::Name)
  }

  pub fn digest(&self) -> Option<&str> {
    self.get(Field::Digest)
  }

  pub fn size_mb(&self) -> Option<&str> {
    self.get(Field::SizeMb)
  }

  /// A record can be refreshed only when url, name and digest are all present.
  pub fn is_eligible(&self) -> bool {
    self.url().is_some() && self.name().is_some() && self.digest().is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
  Comment,
  Blank,
  Record(Record),
}

/// The terminator that followed a line in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
  /// Last line of a file without a trailing newline.
  #[default]
  None,
  Lf,
  CrLf,
}

impl LineEnding {
  pub fn as_str(self) -> &'static str {
    match self {
      LineEnding::None => "",
      LineEnding::Lf => "\n",
      LineEnding::CrLf => "\r\n",
    }
  }
}

/// One physical line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
  raw: String,
  ending: LineEnding,
  kind: LineKind,
}

impl ManifestLine {
  pub fn new(raw: impl Into<String>, ending: LineEnding) -> Self {
    let raw = raw.into();
    let kind = classify(&raw);
    Self { raw, ending, kind }
  }

  /// Split one chunk produced by `split_inclusive('\n')` into text and terminator.
  pub(crate) fn from_chunk(chunk: &str) -> Self {
    if let Some(text) = chunk.strip_suffix("\r\n") {
      Self::new(text, LineEnding::CrLf)
    } else if let Some(text) = chunk.strip_suffix('\n') {
      Self::new(text, LineEnding::Lf)
    } else {
      Self::new(chunk, LineEnding::None)
    }
  }

  pub fn raw(&self) -> &str {
    &self.raw
  }

  pub fn ending(&self) -> LineEnding {
    self.ending
  }

  pub fn kind(&self) -> &LineKind {
    &self.kind
  }

  pub fn record(&self) -> Option<&Record> {
    match &self.kind {
      LineKind::Record(record) => Some(record),
      _ => None,
    }
  }

  pub fn is_comment(&self) -> bool {
    matches!(self.kind, LineKind::Comment)
  }

  /// Replace the first occurrence of `old` in the raw text.
  ///
  /// Returns `true` when the line changed.
  pub fn replace_text(&mut self, old: &str, new: &str) -> bool {
    if old.is_empty() || !self.raw.contains(old) {
      return false;
    }
    let replaced = self.raw.replacen(old, new, 1);
    self.set_raw(replaced)
  }

  /// Overwrite the located text of record fields in place.
  ///
  /// Every other byte of the line, including the spacing between columns, is
  /// preserved. Fields missing from the record are ignored. Returns `true`
  /// when the line changed.
  pub fn replace_fields(&mut self, updates: &[(Field, &str)]) -> bool {
    let Some(record) = self.record() else {
      return false;
    };

    let mut edits: Vec<(Range<usize>, &str)> = updates
      .iter()
      .filter_map(|(field, value)| record.span(*field).map(|span| (span, *value)))
      .collect();
    // Apply right to left so earlier spans stay valid.
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut raw = self.raw.clone();
    for (span, value) in edits {
      raw.replace_range(span, value);
    }
    self.set_raw(raw)
  }

  fn set_raw(&mut self, raw: String) -> bool {
    if raw == self.raw {
      return false;
    }
    self.kind = classify(&raw);
    self.raw = raw;
    true
  }
}

fn classify(raw: &str) -> LineKind {
  if raw.trim_start().starts_with('#') {
    LineKind::Comment
  } else if raw.trim().is_empty() {
    LineKind::Blank
  } else {
    LineKind::Record(Record::tokenize(raw))
  }
}
