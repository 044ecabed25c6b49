//! User-facing status lines.
//!
//! Logging goes through `tracing`; this is the plain progress output the
//! operator reads, silenced by `--quiet`.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    quiet: bool,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn say(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    /// Boxed notice for things the operator has to act on
    pub fn notice(&self, message: &str) {
        let rule = "*".repeat(message.len().clamp(20, 76) + 4);
        self.say(&format!("{rule}\n    {message}\n{rule}"));
    }

    /// Progress bar for `total` items, hidden when quiet
    pub fn progress_bar(&self, total: u64) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
