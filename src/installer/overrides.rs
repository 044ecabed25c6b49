//! Override materializer
//!
//! Replicates the manifest's overrides directory from the unpacked archive
//! into the instance game directory. Every file is copied and overwrites
//! what is there; there is no exclusion list and no rollback.

use crate::modpack::Manifest;
use crate::paths::ensure_dir;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Copy `<cache_dir>/<overrides>` into `instance_root`, returning the number
/// of files copied.
pub fn copy_overrides(manifest: &Manifest, cache_dir: &Path, instance_root: &Path) -> Result<usize> {
    let override_root = cache_dir.join(manifest.overrides_dir()?);

    if !override_root.is_dir() {
        warn!("No overrides directory at {}", override_root.display());
        return Ok(0);
    }

    let mut copied = 0usize;

    for entry in WalkDir::new(&override_root).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk {}", override_root.display()))?;
        let relative = entry
            .path()
            .strip_prefix(&override_root)
            .with_context(|| format!("{} is outside the overrides", entry.path().display()))?;
        let target = instance_root.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target, "override directory")
                .with_context(|| format!("Failed to create {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            ensure_dir(parent, "override directory")
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::copy(entry.path(), &target).with_context(|| {
            format!("Failed to copy {} to {}", entry.path().display(), target.display())
        })?;
        info!("Override: {}", relative.display());
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::manifest_json;

    fn manifest() -> Manifest {
        Manifest::from_json(&manifest_json("Pack", "1.0", &[])).unwrap()
    }

    #[test]
    fn test_replicates_relative_structure() {
        let temp = tempfile::tempdir().unwrap();
        let cache = temp.path().join("cache");
        let instance = temp.path().join("Pack");

        fs::create_dir_all(cache.join("overrides/config")).unwrap();
        fs::create_dir_all(cache.join("overrides/mods")).unwrap();
        fs::create_dir_all(cache.join("overrides/scripts/empty")).unwrap();
        fs::write(cache.join("overrides/config/a.txt"), b"alpha").unwrap();
        fs::write(cache.join("overrides/mods/b.jar"), b"\x50\x4b\x03\x04").unwrap();
        fs::create_dir_all(&instance).unwrap();

        let copied = copy_overrides(&manifest(), &cache, &instance).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(instance.join("config/a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(instance.join("mods/b.jar")).unwrap(), b"\x50\x4b\x03\x04");
        assert!(instance.join("scripts/empty").is_dir());
        assert!(!instance.join("overrides").exists());
    }

    #[test]
    fn test_overwrites_existing_files() {
        let temp = tempfile::tempdir().unwrap();
        let cache = temp.path().join("cache");
        let instance = temp.path().join("Pack");

        fs::create_dir_all(cache.join("overrides/config")).unwrap();
        fs::write(cache.join("overrides/config/a.txt"), b"from pack").unwrap();
        fs::create_dir_all(instance.join("config")).unwrap();
        fs::write(instance.join("config/a.txt"), b"from mod").unwrap();
        fs::write(instance.join("config/keep.txt"), b"untouched").unwrap();

        copy_overrides(&manifest(), &cache, &instance).unwrap();

        assert_eq!(fs::read(instance.join("config/a.txt")).unwrap(), b"from pack");
        assert_eq!(fs::read(instance.join("config/keep.txt")).unwrap(), b"untouched");
    }

    #[test]
    fn test_missing_overrides_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let copied = copy_overrides(&manifest(), temp.path(), &temp.path().join("Pack")).unwrap();
        assert_eq!(copied, 0);
    }

    #[test]
    fn test_rejects_overrides_outside_archive() {
        let temp = tempfile::tempdir().unwrap();
        let cache = temp.path().join("cache");
        let secret = temp.path().join("secret");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&secret).unwrap();
        fs::write(secret.join("key.txt"), b"do not copy").unwrap();
        let instance = temp.path().join("Pack");

        for overrides in ["../secret", secret.to_str().unwrap()] {
            let mut manifest = manifest();
            manifest.overrides = overrides.to_string();

            assert!(copy_overrides(&manifest, &cache, &instance).is_err());
            assert!(!instance.join("key.txt").exists());
        }
    }
}
