//! Digest refresh orchestration.
//!
//! This module provides the core logic for the `distbump refresh` command:
//! 1. Re-tag the manifest text and write it back right away
//! 2. Fetch every eligible artifact (cache first), with bounded parallelism
//! 3. Rewrite the digest and size columns of each record from the fetched bytes
//! 4. Write the manifest after every record that changed
//!
//! A failing artifact is recorded in the summary and never stops the run. The
//! manifest on disk is always a complete, parseable document: an interrupted
//! run leaves finished records updated and the rest untouched, and can simply
//! be started again.

pub mod types;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::cache::ArtifactCache;
use crate::fetch::Fetcher;
use crate::manifest::{DistManifest, Field, substitute_tag};

pub use types::{
  ArtifactFetchResult, RecordError, RecordFailure, RefreshError, RefreshOptions, RefreshSummary, UpdatedRecord,
};

/// An eligible record waiting for its artifact.
#[derive(Debug, Clone)]
struct ArtifactJob {
  /// Zero-based line index in the manifest.
  line: usize,
  name: String,
  url: String,
}

/// Re-tag the manifest and refresh the digest and size of every record.
///
/// # Errors
///
/// Only setup and persistence problems are returned as errors: an empty tag,
/// an unusable cache directory, or a manifest that cannot be read or written.
/// Per-artifact failures are reported in [`RefreshSummary::failed`].
pub async fn refresh(options: &RefreshOptions, fetcher: Arc<dyn Fetcher>) -> Result<RefreshSummary, RefreshError> {
  let current_tag = require_tag("current", &options.current_tag)?;
  let new_tag = require_tag("new", &options.new_tag)?;

  let cache = ArtifactCache::open(&options.cache_dir).await?;

  let path = &options.manifest_path;
  let original = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| RefreshError::ReadManifest {
      path: path.clone(),
      source,
    })?;

  let (retagged, tag_replacements) = substitute_tag(&original, current_tag, new_tag);
  persist_manifest(path, retagged.clone()).await?;
  info!(from = %current_tag, to = %new_tag, count = tag_replacements, "replaced tag");

  let mut manifest = DistManifest::parse(&retagged);
  let mut summary = RefreshSummary {
    manifest: path.clone(),
    tag_replacements,
    ..Default::default()
  };

  let jobs = collect_jobs(&manifest, &mut summary);
  info!(
    records = jobs.len(),
    skipped = summary.skipped,
    jobs = options.jobs,
    "refreshing artifact digests"
  );

  let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
  // Records sharing an artifact name share a cache file and must not race on it.
  let mut file_locks: HashMap<PathBuf, Arc<Mutex<()>>> = HashMap::new();
  let mut pending: HashMap<usize, ArtifactJob> = HashMap::new();
  let mut join_set = JoinSet::new();

  for job in jobs {
    let file_lock = file_locks.entry(cache.path_for(&job.name)).or_default().clone();
    let semaphore = semaphore.clone();
    let cache = cache.clone();
    let fetcher = fetcher.clone();
    let (line, name, url) = (job.line, job.name.clone(), job.url.clone());
    pending.insert(job.line, job);

    join_set.spawn(async move {
      // File lock before the permit, so a waiting task never holds a slot.
      let _file = file_lock.lock().await;
      let result = match semaphore.acquire().await {
        Ok(_permit) => process_artifact(&name, &url, &cache, fetcher.as_ref()).await,
        Err(e) => Err(RecordError::Task(e.to_string())),
      };
      if result.is_err() {
        cache.evict(&name).await;
      }
      (line, result)
    });
  }

  let mut unchanged = Vec::new();
  while let Some(joined) = join_set.join_next().await {
    let (line, result) = match joined {
      Ok(output) => output,
      Err(e) => {
        error!(error = %e, "artifact task panicked");
        continue;
      }
    };
    let Some(job) = pending.remove(&line) else {
      continue;
    };

    match result {
      Ok(artifact) => {
        if artifact.cache_hit {
          summary.cache_hits += 1;
        } else {
          summary.fetched += 1;
        }

        if apply_artifact(&mut manifest, &job, &artifact) {
          persist_manifest(path, manifest.serialize()).await?;
          info!(
            name = %job.name,
            digest = %artifact.digest,
            size_mb = artifact.size_mb,
            "updated record"
          );
          summary.updated.push(UpdatedRecord {
            line: job.line + 1,
            name: job.name,
            digest: artifact.digest.0,
            size_mb: artifact.size_mb,
          });
        } else {
          debug!(name = %job.name, "record already current");
          unchanged.push((job.line, job.name));
        }
      }
      Err(e) => record_failure(&mut summary, job, &e),
    }
  }

  // Anything still pending belonged to a task that panicked.
  let mut orphaned: Vec<ArtifactJob> = pending.into_values().collect();
  orphaned.sort_by_key(|job| job.line);
  for job in orphaned {
    cache.evict(&job.name).await;
    let err = RecordError::Task("task exited without a result".to_string());
    record_failure(&mut summary, job, &err);
  }

  summary.updated.sort_by_key(|r| r.line);
  summary.failed.sort_by_key(|f| f.line);
  unchanged.sort();
  summary.unchanged = unchanged.into_iter().map(|(_, name)| name).collect();

  info!(
    considered = summary.considered,
    updated = summary.updated.len(),
    unchanged = summary.unchanged.len(),
    skipped = summary.skipped,
    failed = summary.failed.len(),
    "refresh complete"
  );

  Ok(summary)
}

/// Reject blank tags. The tag itself is matched verbatim, surrounding spaces included.
fn require_tag<'a>(which: &'static str, tag: &'a str) -> Result<&'a str, RefreshError> {
  if tag.trim().is_empty() {
    return Err(RefreshError::MissingTag { which });
  }
  Ok(tag)
}

/// Pick out records that have a url, name and digest. Everything else is skipped.
fn collect_jobs(manifest: &DistManifest, summary: &mut RefreshSummary) -> Vec<ArtifactJob> {
  let mut jobs = Vec::new();

  for (line, record) in manifest.records() {
    summary.considered += 1;
    match (record.url(), record.name(), record.digest()) {
      (Some(url), Some(name), Some(_)) => jobs.push(ArtifactJob {
        line,
        name: name.to_string(),
        url: url.to_string(),
      }),
      _ => {
        summary.skipped += 1;
        debug!(line = line + 1, "skipping line without url, name and digest");
      }
    }
  }

  jobs
}

/// Fetch (or reuse) one artifact and compute its digest and size.
async fn process_artifact(
  name: &str,
  url: &str,
  cache: &ArtifactCache,
  fetcher: &dyn Fetcher,
) -> Result<ArtifactFetchResult, RecordError> {
  let cache_hit = cache.contains(name).await;

  if cache_hit {
    debug!(name = %name, path = ?cache.path_for(name), "using cached artifact");
  } else {
    info!(url = %url, "fetching artifact");
    let bytes = fetcher.fetch(url).await?;
    cache.store(name, &bytes).await?;
  }

  let bytes = cache.read(name).await?;
  Ok(ArtifactFetchResult::from_bytes(&bytes, cache_hit))
}

/// Rewrite the size and digest columns of the job's line. Returns `true` if the text changed.
fn apply_artifact(manifest: &mut DistManifest, job: &ArtifactJob, artifact: &ArtifactFetchResult) -> bool {
  let size = artifact.size_mb.to_string();
  manifest.line_mut(job.line).is_some_and(|line| {
    line.replace_fields(&[(Field::Digest, artifact.digest.as_str()), (Field::SizeMb, &size)])
  })
}

fn record_failure(summary: &mut RefreshSummary, job: ArtifactJob, err: &RecordError) {
  error!(
    line = job.line + 1,
    name = %job.name,
    url = %job.url,
    error = %err,
    "failed to refresh record"
  );
  summary.failed.push(RecordFailure {
    line: job.line + 1,
    name: job.name,
    url: job.url,
    error: err.to_string(),
  });
}

/// Write the manifest from the blocking pool; the temp file and fsync are synchronous.
async fn persist_manifest(path: &Path, text: String) -> Result<(), RefreshError> {
  let target = path.to_path_buf();
  tokio::task::spawn_blocking(move || write_manifest(&target, &text))
    .await
    .map_err(|e| RefreshError::WriteManifest {
      path: path.to_path_buf(),
      source: std::io::Error::other(e),
    })?
}

/// Replace the manifest on disk with `text`.
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over the manifest, so readers never see a half-written file.
fn write_manifest(path: &Path, text: &str) -> Result<(), RefreshError> {
  let write_err = |source| RefreshError::WriteManifest {
    path: path.to_path_buf(),
    source,
  };

  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
  file.write_all(text.as_bytes()).map_err(write_err)?;
  if let Ok(metadata) = std::fs::metadata(path) {
    file.as_file().set_permissions(metadata.permissions()).map_err(write_err)?;
  }
  file.as_file().sync_all().map_err(write_err)?;
  file.persist(path).map_err(|e| write_err(e.error))?;

  Ok(())
}
