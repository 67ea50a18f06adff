pub const APP_NAME: &str = "distbump";

/// Manifest location relative to the project root.
pub const DEFAULT_MANIFEST_PATH: &str = "sys/dist.txt";

/// Scratch directory for downloaded artifacts, relative to the project root.
pub const CACHE_DIR_NAME: &str = ".tmp";

/// Version file bumped when no explicit file is given.
pub const DEFAULT_VERSION_FILE: &str = "Cargo.toml";

/// Line marker used to find version lines when bumping a version file.
pub const DEFAULT_VERSION_MARKER: &str = "version =";

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Upper bound for a single artifact download.
pub const FETCH_TIMEOUT_SECS: u64 = 1800;
