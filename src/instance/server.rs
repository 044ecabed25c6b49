//! Dedicated server provisioning.
//!
//! Modpack path:
//! 1. Download the Forge installer for `<mc>-<forge>`
//! 2. Probe Java; without it the install is skipped with a notice
//! 3. Run the installer with `--installServer` and remove it afterwards
//! 4. Scan for existing start/install scripts and server jars
//! 5. Offer to generate settings + start scripts when none exist
//!
//! Server bundle path (archive without a manifest): unpack into a named
//! directory, classify what is there, run whichever install route applies,
//! then the same start-script step.

use crate::console::Console;
use crate::downloaders::{self, HttpClient};
use crate::installer::DiscoveryOrder;
use crate::modpack::{self, Manifest};
use crate::paths::{ensure_dir, last_segment, validate_dir_name};

use super::discovery::{classify, Discovery};
use super::java::{run_install_script, JavaRuntime};
use super::prompt::Prompter;
use super::scripts::{install_start_script, ScriptFlavor, StartScripts};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Installer artifact URL for a loader version
pub fn installer_url(base_url: &str, loader_version: &str) -> String {
    format!(
        "{}/{v}/forge-{v}-installer.jar",
        base_url.trim_end_matches('/'),
        v = loader_version
    )
}

/// Server jar produced by the Forge installer for a loader version.
///
/// Older installers produce `forge-<v>-universal.jar`, newer ones
/// `forge-<v>.jar`.
pub fn server_jar_name(dir: &Path, loader_version: &str) -> String {
    let universal = format!("forge-{}-universal.jar", loader_version);
    let plain = format!("forge-{}.jar", loader_version);

    if dir.join(&universal).is_file() {
        universal
    } else if dir.join(&plain).is_file() {
        plain
    } else {
        universal
    }
}

/// Loader version encoded in an installer name.
///
/// `forge-1.12.2-14.23.5.2847-installer.jar` -> `1.12.2-14.23.5.2847`
pub fn installer_loader_version(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix("forge-")?
        .strip_suffix("-installer.jar")
        .filter(|v| !v.is_empty())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// What server provisioning did
#[derive(Debug, Clone, Default)]
pub struct ServerSetup {
    pub instance_dir: PathBuf,
    /// A Forge installer or install script was run
    pub installed: bool,
    /// Java was needed but not found
    pub java_missing: bool,
    pub server_jar: Option<String>,
    pub discovery: Discovery,
    pub scripts: Option<StartScripts>,
}

/// Drives server provisioning
pub struct ServerProvisioner<'a> {
    client: &'a HttpClient,
    installer_base_url: String,
    java: JavaRuntime,
    flavor: ScriptFlavor,
    order: DiscoveryOrder,
    prompter: &'a dyn Prompter,
    console: Console,
}

impl<'a> ServerProvisioner<'a> {
    pub fn new(
        client: &'a HttpClient,
        installer_base_url: impl Into<String>,
        java: JavaRuntime,
        prompter: &'a dyn Prompter,
        console: Console,
    ) -> Self {
        Self {
            client,
            installer_base_url: installer_base_url.into(),
            java,
            flavor: ScriptFlavor::host(),
            order: DiscoveryOrder::Filesystem,
            prompter,
            console,
        }
    }

    pub fn with_flavor(mut self, flavor: ScriptFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_discovery_order(mut self, order: DiscoveryOrder) -> Self {
        self.order = order;
        self
    }

    /// Provision a server for a modpack already materialized in `dir`.
    pub async fn provision(&self, manifest: &Manifest, dir: &Path) -> Result<ServerSetup> {
        self.console.say("Setting up server...");

        let loader_version = manifest
            .loader_version()
            .context("Manifest names no mod loader to install")?;

        let mut setup = ServerSetup {
            instance_dir: dir.to_path_buf(),
            ..Default::default()
        };

        setup.installed = self.install_forge(&loader_version, dir).await?;
        setup.java_missing = !setup.installed;
        setup.server_jar = Some(server_jar_name(dir, &loader_version));
        setup.discovery = self.scan(dir)?;

        self.finish(&mut setup)?;
        Ok(setup)
    }

    /// Treat an archive without a manifest as a pre-built server bundle.
    pub async fn provision_bundle(&self, archive: &Path, work_dir: &Path) -> Result<ServerSetup> {
        self.console.say("Setting up server...");
        self.console
            .say(&format!("Filename is: {}", last_segment(&archive.to_string_lossy())));

        let name = self.prompter.input("Insert name of server instance: ")?;
        let dir = work_dir.join(validate_dir_name(&name)?);
        ensure_dir(&dir, "server directory")
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        modpack::extract_archive(archive, &dir)?;

        let mut setup = ServerSetup {
            instance_dir: dir.clone(),
            ..Default::default()
        };
        let found = self.scan(&dir)?;
        let mut forge_jar = None;

        if let (Some(script), None) = (&found.install_script, &found.server_jar) {
            if self.prompter.confirm("Install forge with existing script?", true)? {
                run_install_script(&dir.join(script), &dir).await?;
                setup.installed = true;
            }
        } else if let (Some(jar), None) = (&found.install_jar, &found.server_jar) {
            if self.prompter.confirm("Install forge with forge install jar?", true)? {
                let installer = dir.join(jar);
                setup.installed = self.run_installer(&installer, &dir).await?;
                setup.java_missing = !setup.installed;
                if setup.installed {
                    forge_jar = installer_loader_version(jar).map(|v| server_jar_name(&dir, v));
                }
            }
        } else if found.server_jar.is_none()
            && self.prompter.confirm("No forge server files found!\nInstall forge?", true)?
        {
            let version = self
                .prompter
                .input("Which forge version is needed? (e.g. 1.12.2-14.23.4.2707): ")?;
            let version = version.trim();
            setup.installed = self.install_forge(version, &dir).await?;
            setup.java_missing = !setup.installed;
            forge_jar = Some(server_jar_name(&dir, version));
        }

        // Pick up whatever the install step produced
        setup.discovery = if setup.installed { self.scan(&dir)? } else { found };
        setup.server_jar = forge_jar.or_else(|| setup.discovery.server_jar.clone());

        self.finish(&mut setup)?;
        Ok(setup)
    }

    /// Download the Forge installer for `loader_version` into `dir` and run it.
    ///
    /// Returns false when Java is missing and the installer was left in place.
    pub async fn install_forge(&self, loader_version: &str, dir: &Path) -> Result<bool> {
        self.console.say("Downloading and installing forge server...");

        let url = installer_url(&self.installer_base_url, loader_version);
        let fetched = downloaders::fetch(self.client, &url, Some(dir))
            .await
            .context("Failed to download Forge installer")?;

        self.run_installer(&fetched.path, dir).await
    }

    async fn run_installer(&self, installer: &Path, dir: &Path) -> Result<bool> {
        if !self.java.is_available().await {
            warn!("Java runtime {} not available", self.java.program().display());
            self.console
                .notice("Can't find java. Please install forge by yourself");
            return Ok(false);
        }

        self.java.run_installer(installer, dir).await?;

        remove_if_exists(installer)?;
        let mut log = installer.as_os_str().to_owned();
        log.push(".log");
        remove_if_exists(Path::new(&log))?;

        self.console.say("Installed forge");
        Ok(true)
    }

    /// Classify the top-level files of `dir`.
    pub fn scan(&self, dir: &Path) -> Result<Discovery> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        if self.order == DiscoveryOrder::SortedByName {
            names.sort();
        }

        let discovery = classify(&names, self.flavor);
        for (role, name) in &discovery.duplicates {
            warn!("multiple {}s found, ignoring {}", role, name);
        }
        Ok(discovery)
    }

    /// Offer start-script generation when the directory has none.
    fn finish(&self, setup: &mut ServerSetup) -> Result<()> {
        if setup.discovery.start_script.is_some() {
            info!(
                "Keeping existing start script {}",
                setup.discovery.start_script.as_deref().unwrap_or_default()
            );
        } else if self
            .prompter
            .confirm("No start script found!\nInstall start script?", true)?
        {
            let jar = setup.server_jar.clone().unwrap_or_else(|| {
                warn!("No server jar known, SERVER_JAR left empty");
                String::new()
            });
            setup.scripts = Some(install_start_script(&setup.instance_dir, self.flavor, &jar)?);
            self.console
                .notice("Please look at the settings file and change the values if you need!");
        }

        self.console.say("Successfully setup server");
        Ok(())
    }
}
