//! Implementation of the `distbump refresh` command.
//!
//! Re-tags the artifact manifest and recomputes the digest and size of every
//! artifact it lists, downloading into the cache directory as needed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use distbump_lib::fetch::HttpFetcher;
use distbump_lib::platform::paths;
use distbump_lib::refresh::{RefreshOptions, refresh};

use crate::output::{OutputFormat, print_json, print_refresh_summary};

/// Arguments for [`cmd_refresh`], as parsed from the command line.
pub struct RefreshArgs {
  pub current_tag: String,
  pub new_tag: String,
  pub manifest: Option<PathBuf>,
  pub cache_dir: Option<PathBuf>,
  pub jobs: usize,
  pub output: OutputFormat,
}

/// Execute the refresh command.
///
/// Explicit paths win over environment overrides, which win over the defaults
/// under the project root.
///
/// # Errors
///
/// Returns an error for empty tags or when the manifest cannot be read or
/// written. Failed artifacts are reported in the summary and turn the exit
/// code into a failure without aborting the run.
pub fn cmd_refresh(args: RefreshArgs) -> Result<ExitCode> {
  let start = Instant::now();
  let root = paths::project_root();

  let manifest_path = args.manifest.unwrap_or_else(|| paths::manifest_path(&root));
  let cache_dir = args.cache_dir.unwrap_or_else(|| paths::cache_dir(&root));
  debug!(root = ?root, manifest = ?manifest_path, cache_dir = ?cache_dir, "resolved paths");
  let options =
    RefreshOptions::new(&manifest_path, cache_dir, args.current_tag, args.new_tag).with_jobs(args.jobs);

  let fetcher = Arc::new(HttpFetcher::new()?);
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = rt
    .block_on(refresh(&options, fetcher))
    .with_context(|| format!("Failed to refresh {}", manifest_path.display()))?;

  if args.output.is_json() {
    print_json(&summary)?;
  } else {
    print_refresh_summary(&summary, start.elapsed());
  }

  Ok(if summary.has_failures() {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  })
}
