//! Type definitions for the modpack manifest format.
//!
//! The manifest is a JSON document at the root of the modpack archive. It
//! names the target Minecraft version and mod loader, the components to
//! download, and the directory of static override files.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Archive entry holding the manifest
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Required value of `manifestType`
pub const MANIFEST_TYPE: &str = "minecraftModpack";

/// The only supported `manifestVersion`
pub const SUPPORTED_MANIFEST_VERSION: u64 = 1;

/// Loader id prefix that marks a Forge loader
const FORGE_PREFIX: &str = "forge-";

fn default_overrides() -> String {
    "overrides".to_string()
}

/// A parsed modpack manifest. Read-only once loaded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(rename = "manifestType")]
    pub manifest_type: String,

    #[serde(rename = "manifestVersion")]
    pub manifest_version: u64,

    /// Modpack name, also the instance directory name.
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub minecraft: MinecraftInfo,

    /// Archive-relative directory with the static override files.
    #[serde(default = "default_overrides")]
    pub overrides: String,

    /// Components to download, in manifest order. Duplicates are kept.
    #[serde(default)]
    pub files: Vec<ComponentDescriptor>,
}

/// Target game version and loaders.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MinecraftInfo {
    #[serde(default)]
    pub version: String,

    /// Element 0 is the loader the instance is set up for.
    #[serde(rename = "modLoaders", default)]
    pub mod_loaders: Vec<ModLoader>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModLoader {
    pub id: String,

    #[serde(default)]
    pub primary: bool,
}

/// One downloadable component on the content host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ComponentDescriptor {
    #[serde(rename = "projectID")]
    pub project_id: u64,

    #[serde(rename = "fileID")]
    pub file_id: u64,
}

impl Manifest {
    /// Parses a manifest from JSON bytes.
    #[cfg(test)]
    pub(crate) fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    /// `overrides` as a path inside the unpacked archive.
    ///
    /// Only plain relative paths are accepted: no root, no `..`, at least one
    /// named component.
    pub fn overrides_dir(&self) -> anyhow::Result<&Path> {
        let path = Path::new(&self.overrides);
        let mut named = false;
        for component in path.components() {
            match component {
                Component::Normal(_) => named = true,
                Component::CurDir => {}
                _ => bail!("Invalid overrides directory in manifest: {:?}", self.overrides),
            }
        }
        if !named {
            bail!("Invalid overrides directory in manifest: {:?}", self.overrides);
        }
        Ok(path)
    }

    /// The authoritative loader (first entry of `modLoaders`).
    pub fn primary_loader(&self) -> Option<&ModLoader> {
        self.minecraft.mod_loaders.first()
    }

    /// Forge version of the primary loader, if it is a Forge loader.
    ///
    /// `forge-14.23.5.2847` -> `14.23.5.2847`
    pub fn forge_version(&self) -> Option<&str> {
        self.primary_loader()
            .and_then(|loader| loader.id.strip_prefix(FORGE_PREFIX))
    }

    /// `<minecraft version>-<loader version>`, as used in Forge artifact names.
    ///
    /// `1.12.2` + `forge-14.23.5.2847` -> `1.12.2-14.23.5.2847`
    pub fn loader_version(&self) -> Option<String> {
        let loader = self.primary_loader()?;
        let id = loader.id.strip_prefix(FORGE_PREFIX).unwrap_or(&loader.id);
        Some(format!("{}-{}", self.minecraft.version, id))
    }

    /// Display name for launcher instances: name and version concatenated.
    pub fn instance_name(&self) -> String {
        format!("{}{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEVTECH: &str = r#"{
        "minecraft": {
            "version": "1.12.2",
            "modLoaders": [{ "id": "forge-14.23.5.2847", "primary": true }]
        },
        "manifestType": "minecraftModpack",
        "manifestVersion": 1,
        "name": "SevTech: Ages",
        "version": "3.1.7",
        "author": "DarkPacks",
        "files": [
            { "projectID": 238222, "fileID": 2803400, "required": true },
            { "projectID": 223794, "fileID": 2757483, "required": true }
        ],
        "overrides": "overrides"
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_json(SEVTECH.as_bytes()).unwrap();

        assert_eq!(manifest.name, "SevTech: Ages");
        assert_eq!(manifest.minecraft.version, "1.12.2");
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(
            manifest.files[0],
            ComponentDescriptor { project_id: 238222, file_id: 2803400 }
        );
        assert_eq!(manifest.overrides, "overrides");
    }

    #[test]
    fn test_loader_versions() {
        let manifest = Manifest::from_json(SEVTECH.as_bytes()).unwrap();

        assert_eq!(manifest.forge_version(), Some("14.23.5.2847"));
        assert_eq!(manifest.loader_version().as_deref(), Some("1.12.2-14.23.5.2847"));
        assert_eq!(manifest.instance_name(), "SevTech: Ages3.1.7");
    }

    #[test]
    fn test_non_forge_loader() {
        let json = r#"{
            "manifestType": "minecraftModpack",
            "manifestVersion": 1,
            "name": "Fabric Pack",
            "minecraft": { "version": "1.20.1", "modLoaders": [{ "id": "fabric-0.15.0" }] }
        }"#;
        let manifest = Manifest::from_json(json.as_bytes()).unwrap();

        assert_eq!(manifest.forge_version(), None);
        assert_eq!(manifest.loader_version().as_deref(), Some("1.20.1-fabric-0.15.0"));
    }

    #[test]
    fn test_defaults_for_sparse_manifest() {
        let json = r#"{ "manifestType": "minecraftModpack", "manifestVersion": 1, "name": "Pack" }"#;
        let manifest = Manifest::from_json(json.as_bytes()).unwrap();

        assert_eq!(manifest.overrides, "overrides");
        assert!(manifest.files.is_empty());
        assert!(manifest.primary_loader().is_none());
        assert_eq!(manifest.loader_version(), None);
    }

    #[test]
    fn test_duplicate_components_are_kept() {
        let json = r#"{
            "manifestType": "minecraftModpack", "manifestVersion": 1, "name": "Pack",
            "files": [{ "projectID": 1, "fileID": 10 }, { "projectID": 1, "fileID": 10 }]
        }"#;
        let manifest = Manifest::from_json(json.as_bytes()).unwrap();
        assert_eq!(manifest.files.len(), 2);
    }

    #[test]
    fn test_overrides_dir_must_stay_relative() {
        let mut manifest = Manifest::from_json(SEVTECH.as_bytes()).unwrap();
        assert_eq!(manifest.overrides_dir().unwrap(), Path::new("overrides"));

        manifest.overrides = "./files/overrides".to_string();
        assert!(manifest.overrides_dir().is_ok());

        for bad in ["", ".", "..", "../outside", "overrides/../../etc", "/etc"] {
            manifest.overrides = bad.to_string();
            assert!(manifest.overrides_dir().is_err(), "{:?} accepted", bad);
        }
    }
}
