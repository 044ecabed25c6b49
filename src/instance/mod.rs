//! Instance finalization
//!
//! After mods and overrides are in place, an instance is either left as is,
//! turned into a launcher instance (`launcher`), or provisioned as a
//! dedicated server (`server`).

pub mod discovery;
pub mod java;
pub mod launcher;
pub mod prompt;
pub mod scripts;
pub mod server;

pub use discovery::{classify, Discovery, Role};
pub use java::JavaRuntime;
pub use launcher::{write_instance_cfg, LauncherProfile};
pub use prompt::{Prompter, TerminalPrompter, Unattended};
pub use scripts::{install_start_script, ScriptFlavor, StartScripts};
pub use server::{ServerProvisioner, ServerSetup};
