//! instance.cfg generation for launcher instances.

use crate::modpack::Manifest;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name the launcher reads instance settings from
pub const INSTANCE_CFG: &str = "instance.cfg";

/// Values written to instance.cfg. Everything not listed is a fixed default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherProfile {
    /// Minecraft version the instance targets.
    pub intended_version: String,
    /// Display name in the launcher.
    pub name: String,
    /// Free-text notes shown in the launcher.
    pub notes: String,
}

impl LauncherProfile {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut notes = format!("Modpack by {}. Generated by packdl.", manifest.author);
        if let Some(forge) = manifest.forge_version() {
            notes.push_str(&format!(" Using Forge {}.", forge));
        }

        Self {
            intended_version: manifest.minecraft.version.clone(),
            name: manifest.instance_name(),
            notes,
        }
    }

    /// Writes the profile as flat `key=value` lines.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "InstanceType=OneSix")?;
        writeln!(out, "IntendedVersion={}", self.intended_version)?;
        writeln!(out, "LogPrePostOutput=true")?;
        writeln!(out, "OverrideCommands=false")?;
        writeln!(out, "OverrideConsole=false")?;
        writeln!(out, "OverrideJavaArgs=false")?;
        writeln!(out, "OverrideJavaLocation=false")?;
        writeln!(out, "OverrideMemory=false")?;
        writeln!(out, "OverrideWindow=false")?;
        writeln!(out, "iconKey=default")?;
        writeln!(out, "lastLaunchTime=0")?;
        writeln!(out, "name={}", self.name)?;
        writeln!(out, "notes={}", self.notes)?;
        writeln!(out, "totalTimePlayed=0")?;
        Ok(())
    }
}

/// Generates instance.cfg in the instance folder.
pub fn write_instance_cfg(manifest: &Manifest, instance_dir: &Path) -> std::io::Result<PathBuf> {
    let path = instance_dir.join(INSTANCE_CFG);
    let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
    LauncherProfile::from_manifest(manifest).write_to(&mut file)?;
    file.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::manifest_json;

    fn parse_cfg(text: &str) -> Vec<(String, String)> {
        text.lines()
            .map(|line| {
                let (k, v) = line.split_once('=').unwrap();
                (k.to_string(), v.to_string())
            })
            .collect()
    }

    #[test]
    fn test_profile_from_forge_manifest() {
        let manifest = Manifest::from_json(&manifest_json("Pack", "1.0.3", &[])).unwrap();
        let profile = LauncherProfile::from_manifest(&manifest);

        assert_eq!(profile.intended_version, "1.12.2");
        assert_eq!(profile.name, "Pack1.0.3");
        assert_eq!(
            profile.notes,
            "Modpack by Tester. Generated by packdl. Using Forge 14.23.5.2847."
        );
    }

    #[test]
    fn test_notes_without_forge() {
        let json = r#"{
            "manifestType": "minecraftModpack", "manifestVersion": 1,
            "name": "Pack", "version": "2", "author": "A",
            "minecraft": { "version": "1.20.1", "modLoaders": [{ "id": "fabric-0.15.0" }] }
        }"#;
        let manifest = Manifest::from_json(json.as_bytes()).unwrap();
        let profile = LauncherProfile::from_manifest(&manifest);

        assert_eq!(profile.notes, "Modpack by A. Generated by packdl.");
    }

    #[test]
    fn test_write_instance_cfg_key_set() {
        let temp = tempfile::tempdir().unwrap();
        let manifest = Manifest::from_json(&manifest_json("Pack", "1.0", &[])).unwrap();

        let path = write_instance_cfg(&manifest, temp.path()).unwrap();
        assert_eq!(path, temp.path().join("instance.cfg"));

        let entries = parse_cfg(&std::fs::read_to_string(&path).unwrap());
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "InstanceType",
                "IntendedVersion",
                "LogPrePostOutput",
                "OverrideCommands",
                "OverrideConsole",
                "OverrideJavaArgs",
                "OverrideJavaLocation",
                "OverrideMemory",
                "OverrideWindow",
                "iconKey",
                "lastLaunchTime",
                "name",
                "notes",
                "totalTimePlayed",
            ]
        );
        assert!(entries.contains(&("name".to_string(), "Pack1.0".to_string())));
        assert!(entries.contains(&("IntendedVersion".to_string(), "1.12.2".to_string())));
    }
}
