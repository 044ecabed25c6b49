//! Pipeline configuration
//!
//! Defines the configuration structure for a modpack run.

use crate::downloaders::DEFAULT_PROJECT_BASE_URL;
use std::path::PathBuf;

/// Fixed worker pool size for component downloads
pub const WORKER_COUNT: usize = 4;

/// Default base URL for Forge installer artifacts
pub const DEFAULT_INSTALLER_BASE_URL: &str = "https://maven.minecraftforge.net/net/minecraftforge/forge";

/// What to build after the mods and overrides are in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceMode {
    /// Plain instance folder, nothing else
    #[default]
    Direct,
    /// Launcher instance with `instance.cfg` and a `.minecraft` game dir
    Launcher,
    /// Dedicated server with Forge installed and start scripts
    Server,
}

/// How the download pool reacts to a failed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure
    #[default]
    FailFast,
    /// Record failures and finish the remaining components
    BestEffort,
}

/// Order in which directory entries are offered to the script/jar classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryOrder {
    /// Whatever order the filesystem returns (not stable across platforms)
    #[default]
    Filesystem,
    /// Sorted by file name, for deterministic first-match results
    SortedByName,
}

/// Configuration for a modpack run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Modpack URL, or archive path when `from_archive` is set
    pub source: String,

    /// Treat `source` as a local archive instead of a URL
    pub from_archive: bool,

    pub mode: InstanceMode,

    /// Root of the download cache
    pub cache_dir: PathBuf,

    /// Directory the instance folder is created in
    pub work_dir: PathBuf,

    /// Base of the per-project listing pages
    pub project_base_url: String,

    /// Base of the Forge installer artifacts
    pub installer_base_url: String,

    /// Concurrent component downloads
    pub workers: usize,

    pub failure_policy: FailurePolicy,

    pub discovery_order: DiscoveryOrder,

    /// Java executable used for probing and running installers
    pub java: PathBuf,

    /// Suppress user-facing progress output
    pub quiet: bool,
}

impl PipelineConfig {
    pub fn new(source: impl Into<String>, cache_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            source: source.into(),
            from_archive: false,
            mode: InstanceMode::Direct,
            cache_dir,
            work_dir,
            project_base_url: DEFAULT_PROJECT_BASE_URL.to_string(),
            installer_base_url: DEFAULT_INSTALLER_BASE_URL.to_string(),
            workers: WORKER_COUNT,
            failure_policy: FailurePolicy::FailFast,
            discovery_order: DiscoveryOrder::Filesystem,
            java: PathBuf::from("java"),
            quiet: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::MissingSource);
        }

        if self.from_archive && !PathBuf::from(&self.source).is_file() {
            return Err(ConfigError::ArchiveNotFound(PathBuf::from(&self.source)));
        }

        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No modpack URL or archive given")]
    MissingSource,

    #[error("Modpack archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("At least one download worker is required")]
    NoWorkers,
}
