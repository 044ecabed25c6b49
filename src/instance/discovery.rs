//! Script and jar discovery in server directories.
//!
//! Classification works on file names only, so it can be tested without a
//! filesystem. Names are matched case-insensitively:
//! - contains `install`: `.sh`/`.bat` is an install script, `.jar` an install jar
//! - else contains `start` with a script extension: start script
//! - else contains `server` with `.jar`: server jar
//!
//! The first match of each role wins; later matches are recorded as duplicates.

use super::scripts::ScriptFlavor;
use std::fmt;

/// What a file in a server directory is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    StartScript,
    InstallScript,
    InstallJar,
    ServerJar,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::StartScript => "start script",
            Role::InstallScript => "install script",
            Role::InstallJar => "install jar",
            Role::ServerJar => "server jar",
        };
        f.write_str(name)
    }
}

/// Role assignment for a directory listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub start_script: Option<String>,
    pub install_script: Option<String>,
    pub install_jar: Option<String>,
    pub server_jar: Option<String>,
    /// Later candidates for an already assigned role
    pub duplicates: Vec<(Role, String)>,
}

impl Discovery {
    fn slot(&mut self, role: Role) -> &mut Option<String> {
        match role {
            Role::StartScript => &mut self.start_script,
            Role::InstallScript => &mut self.install_script,
            Role::InstallJar => &mut self.install_jar,
            Role::ServerJar => &mut self.server_jar,
        }
    }

    fn assign(&mut self, role: Role, name: &str) {
        let slot = self.slot(role);
        if slot.is_none() {
            *slot = Some(name.to_string());
        } else {
            self.duplicates.push((role, name.to_string()));
        }
    }
}

/// Role of a single file name, if it has one
pub fn role_of(name: &str, flavor: ScriptFlavor) -> Option<Role> {
    let lower = name.to_lowercase();
    let is_script = lower.ends_with(flavor.script_extension());
    let is_jar = lower.ends_with(".jar");

    if lower.contains("install") {
        if is_script {
            Some(Role::InstallScript)
        } else if is_jar {
            Some(Role::InstallJar)
        } else {
            None
        }
    } else if lower.contains("start") {
        is_script.then_some(Role::StartScript)
    } else if lower.contains("server") {
        is_jar.then_some(Role::ServerJar)
    } else {
        None
    }
}

/// Classify names in the order given
pub fn classify<S: AsRef<str>>(names: &[S], flavor: ScriptFlavor) -> Discovery {
    let mut discovery = Discovery::default();
    for name in names {
        let name = name.as_ref();
        if let Some(role) = role_of(name, flavor) {
            discovery.assign(role, name);
        }
    }
    discovery
}
