//! Modpack archive handling
//!
//! This module handles:
//! - Downloading the modpack archive into the cache
//! - Reading and validating `manifest.json` from the archive
//! - Unpacking the archive into the per-modpack cache directory

mod types;

pub use types::*;

use crate::downloaders::{self, HttpClient};
use crate::error::PackError;
use crate::paths::{ensure_dir, validate_dir_name, CacheLayout};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::result::ZipError;
use zip::ZipArchive;

/// A validated manifest plus the cache directory its archive was unpacked to
#[derive(Debug, Clone)]
pub struct LoadedModpack {
    pub manifest: Manifest,
    pub cache_dir: PathBuf,
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;

    ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Failed to read as ZIP archive: {}", path.display()))
}

/// Download a modpack archive into `<cache>/modpackfiles`
pub async fn download_modpack_file(client: &HttpClient, url: &str, cache: &CacheLayout) -> Result<PathBuf> {
    let url = downloaders::normalize_modpack_url(url);
    let target_dir = cache.modpack_files_dir();
    ensure_dir(&target_dir, "modpack files directory")?;

    info!("Downloading modpack file from {}", url);
    let fetched = downloaders::fetch(client, &url, Some(&target_dir))
        .await
        .context("Failed to download modpack file")?;

    Ok(fetched.path)
}

/// Check the type sentinel, then the schema version.
pub fn validate_manifest(value: &serde_json::Value) -> Result<(), PackError> {
    let manifest_type = value.get("manifestType").and_then(|v| v.as_str());
    if manifest_type != Some(MANIFEST_TYPE) {
        return Err(PackError::NotAModpack {
            found: manifest_type.map(str::to_string),
        });
    }

    let version = value
        .get("manifestVersion")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    if version.as_u64() != Some(SUPPORTED_MANIFEST_VERSION) {
        return Err(PackError::UnsupportedManifest { version });
    }

    Ok(())
}

fn parse_manifest<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Manifest> {
    let mut entry = match archive.by_name(MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(PackError::MissingManifest.into()),
        Err(e) => return Err(e).context("Failed to read manifest entry"),
    };

    let mut json_data = Vec::new();
    entry
        .read_to_end(&mut json_data)
        .context("Failed to read manifest JSON")?;

    let value: serde_json::Value =
        serde_json::from_slice(&json_data).context("Failed to parse manifest JSON")?;
    validate_manifest(&value)?;

    let mut manifest: Manifest =
        serde_json::from_value(value).context("Manifest is missing required fields")?;
    manifest.name = validate_dir_name(&manifest.name)?.to_string();
    manifest.overrides_dir()?;

    Ok(manifest)
}

/// Open a modpack archive, validate its manifest and unpack it into the cache.
///
/// Unpacking is repeated on every call and overwrites what is there.
pub fn load(archive_path: &Path, cache: &CacheLayout) -> Result<LoadedModpack> {
    info!("Opening modpack archive: {}", archive_path.display());

    let mut archive = open_archive(archive_path)?;
    let manifest = parse_manifest(&mut archive)?;

    info!(
        "Parsed modpack '{}' v{} - {} components",
        manifest.name,
        manifest.version,
        manifest.files.len()
    );

    let cache_dir = cache.extraction_dir(&manifest.name);
    ensure_dir(&cache_dir, "modpack cache directory")
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

    archive
        .extract(&cache_dir)
        .with_context(|| format!("Failed to unpack modpack into {}", cache_dir.display()))?;

    Ok(LoadedModpack { manifest, cache_dir })
}

/// Unpack any archive into a directory (server bundles)
pub fn extract_archive(archive_path: &Path, target_dir: &Path) -> Result<()> {
    let mut archive = open_archive(archive_path)?;
    archive
        .extract(target_dir)
        .with_context(|| format!("Failed to unpack {} into {}", archive_path.display(), target_dir.display()))
}
