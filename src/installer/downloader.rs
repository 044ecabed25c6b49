//! Component download engine
//!
//! A fixed pool of workers drains a shared queue of component descriptors.
//! Each component is resolved through the host's project redirect, fetched
//! into `<instance>/mods`, and reported back on a channel. The caller waits
//! until every outcome is in (or the first failure, under fail-fast).

use crate::downloaders::{self, HttpClient};
use crate::modpack::ComponentDescriptor;
use crate::paths::ensure_dir;

use super::config::FailurePolicy;

use anyhow::{bail, Context, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Progress of the component downloads, emitted once per completed component
#[derive(Debug, Clone)]
pub struct ComponentProgress {
    pub completed: usize,
    pub total: usize,
    pub component: ComponentDescriptor,
    pub file_name: String,
}

/// Progress callback. Invoked while the progress lock is held, so the count
/// and whatever the callback prints stay together.
pub type ProgressCallback = Arc<dyn Fn(&ComponentProgress) + Send + Sync>;

/// Information about a failed component
#[derive(Debug, Clone)]
pub struct FailedComponent {
    pub component: ComponentDescriptor,
    pub error: String,
}

/// Aggregated result of a download run
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub total: usize,
    /// Final value of the progress counter
    pub completed: usize,
    pub files: Vec<PathBuf>,
    pub failed: Vec<FailedComponent>,
}

/// What a worker reports for one component
struct ComponentOutcome {
    component: ComponentDescriptor,
    result: Result<PathBuf>,
}

/// State shared by all workers of one run
struct WorkerShared {
    client: HttpClient,
    project_base_url: String,
    mods_dir: PathBuf,
    queue: Mutex<VecDeque<ComponentDescriptor>>,
    completed: Mutex<usize>,
    total: usize,
    progress: Option<ProgressCallback>,
}

/// Downloads manifest components with a fixed worker pool
pub struct ComponentDownloader {
    client: HttpClient,
    project_base_url: String,
    workers: usize,
    policy: FailurePolicy,
    progress: Option<ProgressCallback>,
}

impl ComponentDownloader {
    pub fn new(client: HttpClient, project_base_url: impl Into<String>, workers: usize, policy: FailurePolicy) -> Self {
        Self {
            client,
            project_base_url: project_base_url.into(),
            workers: workers.max(1),
            policy,
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Download every component into `<target_dir>/mods`.
    ///
    /// Components complete in any order. Duplicates are downloaded once per
    /// occurrence.
    pub async fn download_all(&self, components: &[ComponentDescriptor], target_dir: &Path) -> Result<DownloadReport> {
        let mods_dir = target_dir.join("mods");
        ensure_dir(&mods_dir, "mods directory")
            .with_context(|| format!("Failed to create {}", mods_dir.display()))?;

        let total = components.len();
        let shared = Arc::new(WorkerShared {
            client: self.client.clone(),
            project_base_url: self.project_base_url.clone(),
            mods_dir,
            queue: Mutex::new(components.iter().copied().collect()),
            completed: Mutex::new(0),
            total,
            progress: self.progress.clone(),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            workers.spawn(run_worker(id, Arc::clone(&shared), tx.clone()));
        }
        drop(tx);

        let mut report = DownloadReport {
            total,
            ..Default::default()
        };

        // Drain barrier: the channel closes once every worker has exited
        while let Some(outcome) = rx.recv().await {
            match outcome.result {
                Ok(path) => report.files.push(path),
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => {
                        workers.abort_all();
                        return Err(e).with_context(|| {
                            format!(
                                "Failed to download component (project {}, file {})",
                                outcome.component.project_id, outcome.component.file_id
                            )
                        });
                    }
                    FailurePolicy::BestEffort => {
                        warn!(
                            "Component (project {}, file {}) failed: {:#}",
                            outcome.component.project_id, outcome.component.file_id, e
                        );
                        report.failed.push(FailedComponent {
                            component: outcome.component,
                            error: format!("{:#}", e),
                        });
                    }
                },
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    bail!("Download worker panicked: {}", e);
                }
            }
        }

        report.completed = *shared.completed.lock().await;
        Ok(report)
    }
}

async fn resolve_download_url(client: &HttpClient, base_url: &str, component: ComponentDescriptor) -> Result<String> {
    let listing = downloaders::project_url(base_url, component.project_id);
    let project_page = client
        .final_url(&listing)
        .await
        .with_context(|| format!("Failed to resolve project {}", component.project_id))?;

    Ok(downloaders::component_download_url(&project_page, component.file_id))
}

async fn run_worker(id: usize, shared: Arc<WorkerShared>, tx: mpsc::UnboundedSender<ComponentOutcome>) {
    loop {
        let Some(component) = shared.queue.lock().await.pop_front() else {
            debug!("Worker {} finished", id);
            return;
        };

        let result = download_component(&shared, component).await;

        let result = match result {
            Ok(fetched) => {
                let mut completed = shared.completed.lock().await;
                *completed += 1;
                if let Some(callback) = &shared.progress {
                    callback(&ComponentProgress {
                        completed: *completed,
                        total: shared.total,
                        component,
                        file_name: fetched.file_name(),
                    });
                }
                Ok(fetched.path)
            }
            Err(e) => Err(e),
        };

        if tx.send(ComponentOutcome { component, result }).is_err() {
            // Receiver gone: the run was aborted
            return;
        }
    }
}

async fn download_component(shared: &WorkerShared, component: ComponentDescriptor) -> Result<downloaders::FetchedFile> {
    let url = resolve_download_url(&shared.client, &shared.project_base_url, component).await?;
    debug!("Component {}:{} -> {}", component.project_id, component.file_id, url);
    downloaders::fetch(&shared.client, &url, Some(&shared.mods_dir)).await
}
