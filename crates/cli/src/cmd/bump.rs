//! Implementation of the `distbump bump` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use distbump_lib::consts::DEFAULT_VERSION_FILE;
use distbump_lib::platform::paths;
use distbump_lib::version::{BumpKind, BumpOptions, BumpOutcome, bump_file};

use crate::output::{OutputFormat, print_bump_outcome, print_json};

/// Execute the bump command.
///
/// Every file is bumped independently from its own `package.version`.
pub fn cmd_bump(
  kind: Option<BumpKind>,
  files: Vec<PathBuf>,
  markers: Vec<String>,
  dry_run: bool,
  output: OutputFormat,
) -> Result<()> {
  let files = if files.is_empty() {
    vec![paths::project_root().join(DEFAULT_VERSION_FILE)]
  } else {
    files
  };

  debug!(files = ?files, kind = ?kind, "bumping versions");
  let options = BumpOptions { kind, markers, dry_run };

  let outcomes = files
    .iter()
    .map(|file| bump_file(file, &options).with_context(|| format!("Failed to bump {}", file.display())))
    .collect::<Result<Vec<BumpOutcome>>>()?;

  if output.is_json() {
    return print_json(&outcomes);
  }

  if dry_run {
    println!(
      "{}",
      "Dry run - no changes written".if_supports_color(Stream::Stdout, |s| s.yellow())
    );
    println!();
  }

  for outcome in &outcomes {
    print_bump_outcome(outcome, dry_run);
  }

  Ok(())
}
