//! Server settings and start scripts.
//!
//! Two template sets exist, one per OS family. The flavor is picked once at
//! the edge (`ScriptFlavor::host()`); generation itself does not look at the
//! host OS.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const MIN_RAM: &str = "1024M";
const MAX_RAM: &str = "4096M";
const JAVA_PARAMETERS: &str = "-XX:+UseG1GC -Dsun.rmi.dgc.server.gcInterval=2147483646 \
-XX:+UnlockExperimentalVMOptions -XX:G1NewSizePercent=20 -XX:G1ReservePercent=20 \
-XX:MaxGCPauseMillis=50 -XX:G1HeapRegionSize=32M -Dfml.readTimeout=180";

/// Script template family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFlavor {
    /// `settings.bat` / `ServerStart.bat`
    Windows,
    /// `settings.sh` / `ServerStart.sh`
    Posix,
}

impl ScriptFlavor {
    /// Flavor matching the OS this binary runs on.
    pub fn host() -> Self {
        if cfg!(windows) {
            ScriptFlavor::Windows
        } else {
            ScriptFlavor::Posix
        }
    }

    pub fn script_extension(&self) -> &'static str {
        match self {
            ScriptFlavor::Windows => ".bat",
            ScriptFlavor::Posix => ".sh",
        }
    }

    pub fn settings_file_name(&self) -> String {
        format!("settings{}", self.script_extension())
    }

    pub fn start_file_name(&self) -> String {
        format!("ServerStart{}", self.script_extension())
    }

    /// Settings file exporting the server jar and the JVM defaults.
    pub fn render_settings(&self, server_jar: &str) -> String {
        match self {
            ScriptFlavor::Windows => format!(
                "REM Don't edit these values unless you know what you are doing.\r\n\
                 set SERVER_JAR={server_jar}\r\n\
                 \r\n\
                 REM You can edit these values if you wish.\r\n\
                 set MIN_RAM={MIN_RAM}\r\n\
                 set MAX_RAM={MAX_RAM}\r\n\
                 set JAVA_PARAMETERS={JAVA_PARAMETERS}\r\n"
            ),
            ScriptFlavor::Posix => format!(
                "# Don't edit these values unless you know what you are doing.\n\
                 export SERVER_JAR=\"{server_jar}\"\n\
                 \n\
                 # You can edit these values if you wish.\n\
                 export MIN_RAM=\"{MIN_RAM}\"\n\
                 export MAX_RAM=\"{MAX_RAM}\"\n\
                 export JAVA_PARAMETERS=\"{JAVA_PARAMETERS}\"\n"
            ),
        }
    }

    /// Start script that reads the settings file and launches the server.
    pub fn render_start(&self) -> String {
        match self {
            ScriptFlavor::Windows => format!(
                "@echo off\r\n\
                 \r\n\
                 call {settings}\r\n\
                 \r\n\
                 echo Starting Minecraft Server...\r\n\
                 java -server -Xms%MIN_RAM% -Xmx%MAX_RAM% %JAVA_PARAMETERS% -jar %SERVER_JAR% nogui\r\n\
                 exit /B\r\n",
                settings = self.settings_file_name()
            ),
            ScriptFlavor::Posix => format!(
                "#!/bin/sh\n\
                 \n\
                 # Read the settings.\n\
                 . ./{settings}\n\
                 \n\
                 # Start the server.\n\
                 start_server() {{\n\
                 \x20   java -server -Xms${{MIN_RAM}} -Xmx${{MAX_RAM}} ${{JAVA_PARAMETERS}} -jar ${{SERVER_JAR}} nogui\n\
                 }}\n\
                 \n\
                 echo \"Starting Minecraft Server...\"\n\
                 start_server\n",
                settings = self.settings_file_name()
            ),
        }
    }
}

/// Paths of a generated script pair
#[derive(Debug, Clone)]
pub struct StartScripts {
    pub settings: PathBuf,
    pub start: PathBuf,
}

/// Write the settings and start scripts into `dir`, replacing existing ones.
pub fn install_start_script(dir: &Path, flavor: ScriptFlavor, server_jar: &str) -> Result<StartScripts> {
    let settings = dir.join(flavor.settings_file_name());
    let start = dir.join(flavor.start_file_name());

    std::fs::write(&settings, flavor.render_settings(server_jar))
        .with_context(|| format!("Failed to write {}", settings.display()))?;
    std::fs::write(&start, flavor.render_start())
        .with_context(|| format!("Failed to write {}", start.display()))?;

    #[cfg(unix)]
    {
        if flavor == ScriptFlavor::Posix {
            set_mode(&start, 0o755)?;
        }
    }

    Ok(StartScripts { settings, start })
}

/// Set unix permission bits on a file
#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Cannot read metadata for {}", path.display()))?
        .permissions();
    perms.set_mode(mode);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}
