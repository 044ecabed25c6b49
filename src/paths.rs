//! Cache and instance directory layout
//!
//! The cache holds two kinds of state:
//! - `modpackfiles/` for raw modpack archive downloads
//! - one directory per modpack name holding the unpacked archive
//!
//! Nothing here ever prunes the cache; it is only removed by `--clear-cache`.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the cache subdirectory under the OS cache root
const CACHE_DIR_NAME: &str = "packdl";

/// Subdirectory for downloaded modpack archives
const MODPACK_FILES_DIR: &str = "modpackfiles";

/// Launcher instances keep the game tree in this subdirectory
pub const LAUNCHER_GAME_DIR: &str = ".minecraft";

/// Create a directory if it does not exist yet
pub fn ensure_dir(path: &Path, description: &str) -> std::io::Result<()> {
    if !path.is_dir() {
        debug!("creating {}: {}", description, path.display());
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Filesystem layout of the download cache.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Platform cache root (`~/.cache/packdl`, `%LOCALAPPDATA%\packdl`, ...)
    pub fn default_root() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
            .context("Cannot determine a cache directory for this user")?;
        Ok(base.join(CACHE_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where downloaded modpack archives are kept
    pub fn modpack_files_dir(&self) -> PathBuf {
        self.root.join(MODPACK_FILES_DIR)
    }

    /// Where the archive of the named modpack is unpacked
    pub fn extraction_dir(&self, modpack_name: &str) -> PathBuf {
        self.root.join(modpack_name)
    }

    /// Create the cache root on first run
    pub fn ensure(&self) -> Result<()> {
        ensure_dir(&self.root, "cache directory")
            .with_context(|| format!("Failed to create cache directory: {}", self.root.display()))
    }

    /// Remove the whole cache
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)
                .with_context(|| format!("Failed to clear cache: {}", self.root.display()))?;
        }
        Ok(())
    }
}

/// Check that a modpack or server name is usable as a single directory name.
pub fn validate_dir_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        bail!("Invalid instance name: {:?}", name);
    }
    if trimmed.contains(['/', '\\']) {
        bail!("Instance name must not contain path separators: {:?}", name);
    }
    Ok(trimmed)
}

/// Last `/`-separated segment of a URL or path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_layout_paths() {
        let cache = CacheLayout::new(PathBuf::from("/tmp/cache/packdl"));

        assert_eq!(cache.modpack_files_dir(), PathBuf::from("/tmp/cache/packdl/modpackfiles"));
        assert_eq!(cache.extraction_dir("Pack"), PathBuf::from("/tmp/cache/packdl/Pack"));
    }

    #[test]
    fn test_ensure_and_clear() {
        let temp = tempfile::tempdir().unwrap();
        let cache = CacheLayout::new(temp.path().join("packdl"));

        cache.ensure().unwrap();
        assert!(cache.root().is_dir());

        std::fs::create_dir_all(cache.modpack_files_dir()).unwrap();
        std::fs::write(cache.modpack_files_dir().join("pack.zip"), b"zip").unwrap();

        cache.clear().unwrap();
        assert!(!cache.root().exists());

        // Clearing a missing cache is fine
        cache.clear().unwrap();
    }

    #[test]
    fn test_validate_dir_name() {
        assert_eq!(validate_dir_name("SevTech Ages").unwrap(), "SevTech Ages");
        assert_eq!(validate_dir_name("  Pack ").unwrap(), "Pack");
        assert!(validate_dir_name("").is_err());
        assert!(validate_dir_name("..").is_err());
        assert!(validate_dir_name("a/b").is_err());
        assert!(validate_dir_name("a\\b").is_err());
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("https://host/files/123/mod.jar"), "mod.jar");
        assert_eq!(last_segment("mod.jar"), "mod.jar");
        assert_eq!(last_segment("https://host/files/"), "");
    }
}
