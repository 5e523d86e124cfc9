//! Startup orchestration.
//!
//! # Responsibilities
//! - Load every configured API in order
//! - Start one watcher per API that asked for hot reload
//! - Apply reloaded APIs to the running engine
//!
//! # Design Decisions
//! - An API whose definition cannot be loaded is served disabled, keeping
//!   its slot so a later fix can be reloaded into place
//! - Watcher failures are logged; the API keeps serving without reload

use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::{load_api, ApiConfig, ApiReload, ApiWatcher};
use crate::pipeline::{MockApi, MockEngine};

/// Load the APIs named in `apis`, one slot per entry.
pub fn load_apis(apis: &[ApiConfig]) -> Vec<MockApi> {
    apis.iter()
        .map(|entry| match load_api(&entry.api_file) {
            Ok(api) => api,
            Err(e) => {
                tracing::error!(
                    api_file = %entry.api_file.display(),
                    error = %e,
                    "Failed to load API definition. The API will be disabled"
                );
                MockApi::disabled("")
            }
        })
        .collect()
}

/// Start watchers for every API with `watch` enabled.
///
/// The returned watchers must be kept alive for reloads to keep flowing.
pub fn start_watchers(
    apis: &[ApiConfig],
    update_tx: &mpsc::UnboundedSender<ApiReload>,
) -> Vec<RecommendedWatcher> {
    apis.iter()
        .enumerate()
        .filter(|(_, entry)| entry.watch)
        .filter_map(|(index, entry)| {
            match ApiWatcher::new(index, &entry.api_file, update_tx.clone()).run() {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    tracing::warn!(
                        api_file = %entry.api_file.display(),
                        error = %e,
                        "Failed to watch API definition; hot reload disabled"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Swap reloaded APIs into `engine` until shutdown or until every sender is gone.
pub fn spawn_reload_loop(
    engine: Arc<MockEngine>,
    mut updates: mpsc::UnboundedReceiver<ApiReload>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(ApiReload { index, api }) = update else {
                        break;
                    };
                    let base_url = api.base_url().to_string();
                    if engine.replace_api(index, api) {
                        tracing::info!(index, base_url = %base_url, "API reloaded");
                    } else {
                        tracing::warn!(index, "Reloaded API has no slot in the engine");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!("Reload loop stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthorizationEvaluator, KeyStore};
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_load_apis_keeps_slots() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.json"), "[]").unwrap();
        fs::write(
            dir.path().join("api.json"),
            r#"{ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }"#,
        )
        .unwrap();

        let apis = load_apis(&[
            ApiConfig::new(dir.path().join("missing.json")),
            ApiConfig::new(dir.path().join("api.json")),
        ]);

        assert_eq!(apis.len(), 2);
        assert!(!apis[0].is_enabled());
        assert!(apis[1].is_enabled());
    }

    #[test]
    fn test_watchers_respect_flag() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("api.json"), "{}").unwrap();
        let (tx, _rx) = ApiWatcher::channel();

        let mut unwatched = ApiConfig::new(dir.path().join("api.json"));
        unwatched.watch = false;

        assert!(start_watchers(&[unwatched], &tx).is_empty());
        assert_eq!(start_watchers(&[ApiConfig::new(dir.path().join("api.json"))], &tx).len(), 1);
    }

    #[tokio::test]
    async fn test_reload_loop_swaps_apis() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.json"), r#"[{"id": 1}]"#).unwrap();
        fs::write(
            dir.path().join("api.json"),
            r#"{ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }"#,
        )
        .unwrap();

        let engine = Arc::new(MockEngine::new(
            vec![MockApi::disabled("")],
            AuthorizationEvaluator::new(Arc::new(KeyStore::new())),
        ));
        let (tx, rx) = ApiWatcher::channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_reload_loop(engine.clone(), rx, shutdown_rx);

        let api = load_api(&dir.path().join("api.json")).unwrap();
        tx.send(ApiReload { index: 0, api }).unwrap();

        let mut reloaded = false;
        for _ in 0..50 {
            if engine.apis()[0].is_enabled() {
                reloaded = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(reloaded);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
