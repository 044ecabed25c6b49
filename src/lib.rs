//! packdl - Minecraft modpack downloader
//!
//! Fetches a modpack archive, downloads every mod its manifest lists,
//! lays down the overrides and optionally turns the result into a launcher
//! instance or a dedicated server.

pub mod console;
pub mod downloaders;
pub mod error;
pub mod installer;
pub mod instance;
pub mod modpack;
pub mod paths;

#[cfg(test)]
mod test_support;
