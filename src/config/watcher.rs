//! API definition watcher for hot reload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_api_definition, reload_api};
use crate::observability::metrics;
use crate::pipeline::MockApi;

/// A freshly loaded API, replacing the one at `index`.
#[derive(Debug)]
pub struct ApiReload {
    pub index: usize,
    pub api: MockApi,
}

/// Monitors an API definition file and its data file.
///
/// The data file's directory is resolved once at start; a definition that
/// later moves `dataFile` elsewhere is only picked up through its own changes.
pub struct ApiWatcher {
    index: usize,
    api_file: PathBuf,
    update_tx: mpsc::UnboundedSender<ApiReload>,
}

impl ApiWatcher {
    /// Create a watcher for the API at `index`.
    pub fn new(index: usize, api_file: &Path, update_tx: mpsc::UnboundedSender<ApiReload>) -> Self {
        Self {
            index,
            api_file: api_file.to_path_buf(),
            update_tx,
        }
    }

    /// Create a channel for reloads.
    pub fn channel() -> (mpsc::UnboundedSender<ApiReload>, mpsc::UnboundedReceiver<ApiReload>) {
        mpsc::unbounded_channel()
    }

    /// Start watching in a background thread. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let targets = watch_targets(&self.api_file)?;
        let tx = self.update_tx.clone();
        let api_file = self.api_file.clone();
        let index = self.index;
        let callback_targets = targets.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_relevant(&event, &callback_targets) {
                        return;
                    }
                    tracing::info!(api_file = %api_file.display(), "API change detected, reloading...");
                    reload(index, &api_file, &tx);
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let mut watched_dirs: Vec<&Path> = targets.iter().filter_map(|t| t.parent()).collect();
        watched_dirs.dedup();
        for dir in watched_dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(api_file = %self.api_file.display(), "API watcher started");
        Ok(watcher)
    }
}

/// Reload the API at `index` and hand it to the engine. A failed reload
/// sends nothing, leaving the current API in service.
fn reload(index: usize, api_file: &Path, tx: &mpsc::UnboundedSender<ApiReload>) {
    match reload_api(api_file) {
        Ok(api) => {
            metrics::record_reload(true);
            let _ = tx.send(ApiReload { index, api });
        }
        Err(e) => {
            metrics::record_reload(false);
            tracing::error!(
                api_file = %api_file.display(),
                "Failed to reload API: {}. Keeping current definition.",
                e
            );
        }
    }
}

/// Canonical paths of the definition file and, when resolvable, its data file.
///
/// Directories are watched rather than files so a data file created after
/// startup is still noticed.
fn watch_targets(api_file: &Path) -> io::Result<Vec<PathBuf>> {
    let api_target = canonical_target(api_file)?;
    let mut targets = vec![api_target.clone()];

    if let Ok(definition) = load_api_definition(&api_target) {
        if let Ok(data_target) = canonical_target(&definition.data_file_path(&api_target)) {
            if data_target != api_target {
                targets.push(data_target);
            }
        }
    }

    Ok(targets)
}

/// Canonicalize the parent directory only; the file itself may not exist yet.
fn canonical_target(path: &Path) -> io::Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(file_name))
}

fn is_relevant(event: &Event, targets: &[PathBuf]) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|path| targets.contains(path))
}
