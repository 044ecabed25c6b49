//! packdl - Minecraft modpack downloader

use anyhow::{Context, Result};
use clap::Parser;
use packdl::error::{exit_code_for, PackError, EXIT_NO_ERROR, EXIT_TERMINATED_BY_USER};
use packdl::installer::{FailurePolicy, InstanceMode, Installer, PipelineConfig};
use packdl::instance::{Prompter, TerminalPrompter, Unattended};
use packdl::paths::CacheLayout;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packdl")]
#[command(version)]
#[command(about = "Download Minecraft modpacks and set them up as instances or servers")]
struct Cli {
    /// Modpack URL, or the path of a modpack archive with --zip
    #[arg(required_unless_present = "clear_cache")]
    file: Option<String>,

    /// Create a MultiMC launcher instance
    #[arg(short, long, conflicts_with = "server")]
    multimc: bool,

    /// Set up a dedicated server
    #[arg(short, long)]
    server: bool,

    /// FILE is a local archive instead of a URL
    #[arg(short, long)]
    zip: bool,

    /// Remove the download cache and exit
    #[arg(long)]
    clear_cache: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,

    /// Enable debug logging (RUST_LOG is honoured as well)
    #[arg(short, long)]
    debug: bool,

    /// Answer every question with its default
    #[arg(short, long)]
    yes: bool,

    /// Keep going when single mods fail to download
    #[arg(long)]
    best_effort: bool,

    /// Cache directory (defaults to the user cache dir)
    #[arg(long, env = "PACKDL_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Java executable used to run the Forge installer
    #[arg(long, default_value = "java")]
    java: PathBuf,
}

fn init_logging(debug: bool) -> Result<()> {
    let directive = if debug { "packdl=debug" } else { "packdl=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let cache_dir = match cli.cache_dir {
        Some(dir) => dir,
        None => CacheLayout::default_root()?,
    };

    if cli.clear_cache {
        CacheLayout::new(cache_dir).clear()?;
        if !cli.quiet {
            println!("Cache cleared");
        }
        return Ok(());
    }

    let Some(source) = cli.file else {
        anyhow::bail!("No modpack URL or archive given");
    };

    let work_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let mut config = PipelineConfig::new(source, cache_dir, work_dir);
    config.from_archive = cli.zip;
    config.mode = if cli.multimc {
        InstanceMode::Launcher
    } else if cli.server {
        InstanceMode::Server
    } else {
        InstanceMode::Direct
    };
    if cli.best_effort {
        config.failure_policy = FailurePolicy::BestEffort;
    }
    config.java = cli.java;
    config.quiet = cli.quiet;

    let prompter: Box<dyn Prompter> = if cli.yes {
        Box::new(Unattended::default())
    } else {
        Box::new(TerminalPrompter)
    };

    if !config.quiet {
        println!("packdl {}", env!("CARGO_PKG_VERSION"));
    }

    let installer = Installer::new(config, prompter)?;
    installer.run().await.map(|_| ())
}

/// Exit with the interrupt status on Ctrl-C, whatever the run is doing.
///
/// The listener runs on a runtime worker, so a run blocked on a prompt or a
/// child process cannot hold it up. In-flight downloads are abandoned.
fn install_interrupt_handler() -> Result<()> {
    #[cfg(unix)]
    let mut interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .context("Failed to listen for SIGINT")?;
    #[cfg(windows)]
    let mut interrupt = tokio::signal::windows::ctrl_c().context("Failed to listen for Ctrl-C")?;

    tokio::spawn(async move {
        if interrupt.recv().await.is_some() {
            error!("{}", PackError::TerminatedByUser);
            std::process::exit(i32::from(EXIT_TERMINATED_BY_USER));
        }
    });
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug) {
        eprintln!("Failed to set up logging: {:#}", e);
    }

    if let Err(e) = install_interrupt_handler() {
        error!("{:#}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::from(EXIT_NO_ERROR),
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e)
        }
    }
}
