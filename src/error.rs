//! Fatal outcomes and their process exit statuses.
//!
//! Most failures travel as `anyhow::Error`. The ones the operator has to be able
//! to tell apart are raised as [`PackError`] so `main` can find them in the
//! error chain and pick the matching status.

use std::process::ExitCode;

/// Exit status for a completed run.
pub const EXIT_NO_ERROR: u8 = 0;
/// The archive is not a modpack (wrong `manifestType` or no manifest at all).
pub const EXIT_NO_MODPACK: u8 = 2;
/// The manifest schema version is not supported.
pub const EXIT_UNKNOWN_MANIFEST_VERSION: u8 = 3;
/// The run was interrupted with Ctrl-C.
pub const EXIT_TERMINATED_BY_USER: u8 = 9;
/// Any other transport or filesystem failure.
pub const EXIT_UNKNOWN_ERROR: u8 = 100;

/// Classified fatal conditions.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Not a Minecraft modpack (manifestType is {found:?})")]
    NotAModpack { found: Option<String> },

    #[error("This is no modpack: the archive has no manifest.json")]
    MissingManifest,

    #[error("Can't read manifest: unsupported manifestVersion {version}")]
    UnsupportedManifest { version: serde_json::Value },

    #[error("Terminated by user")]
    TerminatedByUser,
}

impl PackError {
    /// Process exit status for this outcome.
    pub fn exit_status(&self) -> u8 {
        match self {
            PackError::NotAModpack { .. } | PackError::MissingManifest => EXIT_NO_MODPACK,
            PackError::UnsupportedManifest { .. } => EXIT_UNKNOWN_MANIFEST_VERSION,
            PackError::TerminatedByUser => EXIT_TERMINATED_BY_USER,
        }
    }
}

/// Map an error chain to the exit status the process should end with.
pub fn exit_status_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PackError>())
        .map(PackError::exit_status)
        .unwrap_or(EXIT_UNKNOWN_ERROR)
}

/// Convenience wrapper for `main`.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status_for(err))
}
