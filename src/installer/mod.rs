//! Modpack pipeline orchestrator
//!
//! Runs the phases of a modpack install:
//! 1. Acquire  - download the modpack archive or use a local one
//! 2. Load     - validate the manifest and unpack into the cache
//! 3. Download - fetch every component into `<game dir>/mods`
//! 4. Overrides - copy the static files over the game dir
//! 5. Finalize - launcher instance.cfg or server provisioning
//!
//! An archive without a manifest takes the server-bundle path instead when
//! server mode was requested.

pub mod config;
pub mod downloader;
pub mod overrides;

pub use config::{
    ConfigError, DiscoveryOrder, FailurePolicy, InstanceMode, PipelineConfig, WORKER_COUNT,
};
pub use downloader::{ComponentDownloader, ComponentProgress, DownloadReport, FailedComponent, ProgressCallback};
pub use overrides::copy_overrides;

use crate::console::Console;
use crate::downloaders::HttpClient;
use crate::error::PackError;
use crate::instance::{self, JavaRuntime, Prompter, ServerProvisioner, ServerSetup};
use crate::modpack::{self, LoadedModpack};
use crate::paths::{ensure_dir, CacheLayout, LAUNCHER_GAME_DIR};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

fn log_phase(phase: &str, started: Instant) {
    info!(
        "Phase done: phase='{}' elapsed_ms={}",
        phase,
        started.elapsed().as_millis()
    );
}

/// Paths shared by the phases of one run, fixed once the manifest is loaded
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub cache: CacheLayout,
    /// Where the modpack archive was unpacked
    pub modpack_cache_dir: PathBuf,
    /// Named instance folder under the working directory
    pub instance_dir: PathBuf,
    /// Root the mods and overrides land in
    pub game_dir: PathBuf,
}

impl PipelineContext {
    pub fn new(cache: CacheLayout, loaded: &LoadedModpack, work_dir: &Path, mode: InstanceMode) -> Self {
        let instance_dir = work_dir.join(&loaded.manifest.name);
        let game_dir = match mode {
            InstanceMode::Launcher => instance_dir.join(LAUNCHER_GAME_DIR),
            InstanceMode::Direct | InstanceMode::Server => instance_dir.clone(),
        };

        Self {
            cache,
            modpack_cache_dir: loaded.cache_dir.clone(),
            instance_dir,
            game_dir,
        }
    }
}

/// What a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    pub name: String,
    pub instance_dir: PathBuf,
    pub game_dir: PathBuf,
    pub downloads: DownloadReport,
    pub overrides_copied: usize,
    pub launcher_cfg: Option<PathBuf>,
    pub server: Option<ServerSetup>,
}

/// Main pipeline driver
pub struct Installer {
    config: PipelineConfig,
    client: HttpClient,
    prompter: Box<dyn Prompter>,
    console: Console,
}

impl Installer {
    pub fn new(config: PipelineConfig, prompter: Box<dyn Prompter>) -> Result<Self> {
        config.validate()?;
        let console = Console::new(config.quiet);

        Ok(Self {
            config,
            client: HttpClient::new()?,
            prompter,
            console,
        })
    }

    fn provisioner(&self) -> ServerProvisioner<'_> {
        ServerProvisioner::new(
            &self.client,
            self.config.installer_base_url.clone(),
            JavaRuntime::new(&self.config.java),
            self.prompter.as_ref(),
            self.console,
        )
        .with_discovery_order(self.config.discovery_order)
    }

    /// Local archive path, downloading it into the cache first for URLs
    async fn acquire_archive(&self, cache: &CacheLayout) -> Result<PathBuf> {
        if self.config.from_archive {
            return Ok(PathBuf::from(&self.config.source));
        }

        self.console.say("Downloading modpack file...");
        modpack::download_modpack_file(&self.client, &self.config.source, cache).await
    }

    /// Run every phase. Fatal conditions come back as errors carrying a
    /// [`PackError`] where the operator needs a specific outcome.
    pub async fn run(&self) -> Result<RunSummary> {
        let cache = CacheLayout::new(self.config.cache_dir.clone());
        cache.ensure()?;

        // === Acquire ===
        let started = Instant::now();
        let archive = self.acquire_archive(&cache).await?;
        log_phase("Acquire", started);

        // === Load ===
        let started = Instant::now();
        self.console.say("Unpacking modpack...");
        let loaded = match modpack::load(&archive, &cache) {
            Ok(loaded) => loaded,
            Err(e) if matches!(e.downcast_ref::<PackError>(), Some(PackError::MissingManifest)) => {
                if self.config.mode == InstanceMode::Server {
                    self.console.say("No manifest found, treating the archive as a server bundle");
                    return self.run_server_bundle(&archive).await;
                }
                return Err(PackError::NotAModpack { found: None }.into());
            }
            Err(e) => return Err(e),
        };
        log_phase("Load", started);

        let manifest = &loaded.manifest;
        let ctx = PipelineContext::new(cache, &loaded, &self.config.work_dir, self.config.mode);
        ensure_dir(&ctx.game_dir, "instance directory")
            .with_context(|| format!("Failed to create {}", ctx.game_dir.display()))?;

        self.console.say(&format!(
            "Modpack: {} {} by {} ({} mods)",
            manifest.name,
            manifest.version,
            manifest.author,
            manifest.files.len()
        ));

        // === Download ===
        let started = Instant::now();
        let downloads = self.download_phase(&loaded, &ctx).await?;
        log_phase("Download", started);

        // === Overrides ===
        // Only after the drain barrier: overrides win over downloaded files
        let started = Instant::now();
        self.console.say("Copying overrides...");
        let overrides_copied = copy_overrides(manifest, &ctx.modpack_cache_dir, &ctx.game_dir)?;
        self.console.say(&format!("Copied {} override files", overrides_copied));
        log_phase("Overrides", started);

        let mut summary = RunSummary {
            name: manifest.name.clone(),
            instance_dir: ctx.instance_dir.clone(),
            game_dir: ctx.game_dir.clone(),
            downloads,
            overrides_copied,
            ..Default::default()
        };

        // === Finalize ===
        let started = Instant::now();
        match self.config.mode {
            InstanceMode::Direct => {}
            InstanceMode::Launcher => {
                self.console.say("Creating launcher instance...");
                let cfg = instance::write_instance_cfg(manifest, &ctx.instance_dir)
                    .with_context(|| format!("Failed to write instance.cfg in {}", ctx.instance_dir.display()))?;
                summary.launcher_cfg = Some(cfg);
            }
            InstanceMode::Server => {
                summary.server = Some(self.provisioner().provision(manifest, &ctx.instance_dir).await?);
            }
        }
        log_phase("Finalize", started);

        self.console
            .say(&format!("Finished: {}", ctx.instance_dir.display()));
        Ok(summary)
    }

    async fn download_phase(&self, loaded: &LoadedModpack, ctx: &PipelineContext) -> Result<DownloadReport> {
        let components = &loaded.manifest.files;
        self.console.say("Downloading mods...");

        let pb = self.console.progress_bar(components.len() as u64);
        pb.set_message("Downloading mods...");

        let bar = pb.clone();
        let progress: ProgressCallback = Arc::new(move |p: &ComponentProgress| {
            bar.set_position(p.completed as u64);
            bar.println(format!("Downloaded mod {} of {}: {}", p.completed, p.total, p.file_name));
        });

        let downloader = ComponentDownloader::new(
            self.client.clone(),
            self.config.project_base_url.clone(),
            self.config.workers,
            self.config.failure_policy,
        )
        .with_progress(progress);

        let result = downloader.download_all(components, &ctx.game_dir).await;
        pb.finish_and_clear();
        let report = result?;

        if !report.failed.is_empty() {
            warn!("{} of {} mods failed to download", report.failed.len(), report.total);
            self.console
                .say(&format!("{} mods failed to download:", report.failed.len()));
            for failed in &report.failed {
                self.console.say(&format!(
                    "  - project {}, file {}: {}",
                    failed.component.project_id, failed.component.file_id, failed.error
                ));
            }
        }

        self.console.say("Mods downloaded");
        Ok(report)
    }

    async fn run_server_bundle(&self, archive: &Path) -> Result<RunSummary> {
        ensure_dir(&self.config.work_dir, "working directory")?;
        let setup = self
            .provisioner()
            .provision_bundle(archive, &self.config.work_dir)
            .await?;

        let name = setup
            .instance_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(RunSummary {
            name,
            instance_dir: setup.instance_dir.clone(),
            game_dir: setup.instance_dir.clone(),
            server: Some(setup),
            ..Default::default()
        })
    }
}
