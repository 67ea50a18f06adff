mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use distbump_lib::version::BumpKind;

use crate::output::{OutputFormat, print_error};

/// distbump - Re-tag the prebuilt artifact manifest and refresh its digests
#[derive(Parser)]
#[command(name = "distbump")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Point the manifest at a new tag and recompute artifact digests and sizes
  Refresh {
    /// Tag currently referenced by the manifest (e.g. v1.10.3)
    current_tag: String,

    /// Tag to switch to (e.g. v1.10.4)
    new_tag: String,

    /// Manifest file (default: $DISTBUMP_MANIFEST or ./sys/dist.txt)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Artifact cache directory (default: $DISTBUMP_CACHE_DIR or ./.tmp)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Number of artifacts to download in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Bump the package version in Cargo manifests
  Bump {
    /// Version component to increment (default: patch, rolling over at 9)
    kind: Option<BumpKind>,

    /// Cargo manifest to bump (repeatable, default: ./Cargo.toml)
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,

    /// Text identifying lines that carry the version (repeatable, default: "version =")
    #[arg(long = "marker")]
    markers: Vec<String>,

    /// Show the new version without writing files
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<ExitCode> {
  match cli.command {
    Commands::Refresh {
      current_tag,
      new_tag,
      manifest,
      cache_dir,
      jobs,
      output,
    } => cmd::cmd_refresh(cmd::RefreshArgs {
      current_tag,
      new_tag,
      manifest,
      cache_dir,
      jobs,
      output,
    }),
    Commands::Bump {
      kind,
      files,
      markers,
      dry_run,
      output,
    } => cmd::cmd_bump(kind, files, markers, dry_run, output).map(|()| ExitCode::SUCCESS),
  }
}
