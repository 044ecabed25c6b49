//! Java runtime access for running Forge installers.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Flag that makes the Forge installer set up a dedicated server
const INSTALL_SERVER_FLAG: &str = "--installServer";

/// A Java executable, resolved lazily on each use
#[derive(Debug, Clone)]
pub struct JavaRuntime {
    program: PathBuf,
}

impl JavaRuntime {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Probe the runtime with `-version`. Any failure to start it counts as
    /// "not installed".
    pub async fn is_available(&self) -> bool {
        if self.program.components().count() == 1 && which::which(&self.program).is_err() {
            debug!("{} not found on PATH", self.program.display());
            return false;
        }

        match Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => {
                debug!("{} -version exited with {}", self.program.display(), status);
                true
            }
            Err(e) => {
                debug!("Cannot run {}: {}", self.program.display(), e);
                false
            }
        }
    }

    /// Run `java -jar <installer> --installServer` inside `work_dir`.
    pub async fn run_installer(&self, installer: &Path, work_dir: &Path) -> Result<()> {
        info!("Running {} in {}", installer.display(), work_dir.display());

        let status = Command::new(&self.program)
            .arg("-jar")
            .arg(installer)
            .arg(INSTALL_SERVER_FLAG)
            .current_dir(work_dir)
            .status()
            .await
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !status.success() {
            bail!("Installer {} failed: {}", installer.display(), status);
        }
        Ok(())
    }
}

/// Run an install script shipped with a server bundle, after making it executable.
pub async fn run_install_script(script: &Path, work_dir: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        super::scripts::set_mode(script, 0o766)?;
    }

    info!("Running {} in {}", script.display(), work_dir.display());

    let mut command = if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(script);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg(script);
        command
    };

    let status = command
        .current_dir(work_dir)
        .status()
        .await
        .with_context(|| format!("Failed to run {}", script.display()))?;

    if !status.success() {
        bail!("Install script {} failed: {}", script.display(), status);
    }
    Ok(())
}
