//! Terminal rendering for distbump.
//!
//! Commands hand their results to this module, which renders refreshed
//! records, failures and summaries either as colored text or as JSON.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use distbump_lib::refresh::{RecordFailure, RefreshSummary, UpdatedRecord};
use distbump_lib::version::BumpOutcome;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const MODIFY: &str = "~";
}

/// Short form of an uppercase digest for per-record lines.
pub fn short_digest(digest: &str) -> &str {
  &digest[..digest.len().min(12)]
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// `~ name DIGEST (N MB)`
pub fn print_updated_record(record: &UpdatedRecord) {
  println!(
    "  {} {} {} {}",
    symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
    record.name.if_supports_color(Stream::Stdout, |s| s.cyan()),
    short_digest(&record.digest).if_supports_color(Stream::Stdout, |s| s.green()),
    format!("({} MB)", record.size_mb).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

/// `✗ name error`
pub fn print_failed_record(failure: &RecordFailure) {
  println!(
    "  {} {} {}",
    symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
    failure.name.if_supports_color(Stream::Stdout, |s| s.cyan()),
    failure.error.if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

/// Label/value pairs of the refresh stat block, in display order.
pub fn refresh_stats(summary: &RefreshSummary, elapsed: Duration) -> Vec<(&'static str, String)> {
  vec![
    ("Manifest", summary.manifest.display().to_string()),
    ("Tag replacements", summary.tag_replacements.to_string()),
    ("Records considered", summary.considered.to_string()),
    ("Records updated", summary.updated.len().to_string()),
    ("Records unchanged", summary.unchanged.len().to_string()),
    ("Records skipped", summary.skipped.to_string()),
    ("Records failed", summary.failed.len().to_string()),
    ("Downloaded", summary.fetched.to_string()),
    ("Cache hits", summary.cache_hits.to_string()),
    ("Duration", format_duration(elapsed)),
  ]
}

/// Per-record lines, the overall status and the stat block of a refresh.
pub fn print_refresh_summary(summary: &RefreshSummary, elapsed: Duration) {
  for record in &summary.updated {
    print_updated_record(record);
  }
  for failure in &summary.failed {
    print_failed_record(failure);
  }

  println!();
  if summary.has_failures() {
    print_warning(&format!(
      "{} record(s) failed; re-run to retry, completed records are kept",
      summary.failed.len()
    ));
  } else if summary.updated.is_empty() {
    print_info("All records are up to date.");
  } else {
    print_success("Manifest refreshed!");
  }

  for (label, value) in refresh_stats(summary, elapsed) {
    print_stat(label, &value);
  }
}

/// `~ Bumped path: old -> new`, or `Would bump` on a dry run.
pub fn print_bump_outcome(outcome: &BumpOutcome, dry_run: bool) {
  let prefix = if dry_run { "Would bump" } else { "Bumped" };
  println!(
    "  {} {} {}: {} {}",
    symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
    prefix,
    outcome.path.display().if_supports_color(Stream::Stdout, |s| s.cyan()),
    format!("{} ->", outcome.old_version).if_supports_color(Stream::Stdout, |s| s.dimmed()),
    outcome.new_version.if_supports_color(Stream::Stdout, |s| s.green())
  );
  if outcome.lines_changed == 0 {
    print_info("  no lines matched the version markers");
  }
}
