//! Configuration file watcher for hot-reload support
//!
//! Only the settings that can change under a running session are applied on
//! reload: sample interval, grace period, connect button, keymap and whether
//! simulated controllers are accepted. Physical input and the games directory
//! are read once at startup.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Time to let an editor finish writing before re-reading the file
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the config file and yields freshly validated configs
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Load the config at `config_path` and start watching it
    pub async fn new(config_path: impl AsRef<Path>) -> Result<(Self, AppConfig)> {
        let path = config_path.as_ref().to_path_buf();
        let path_str = path.to_string_lossy().to_string();
        let (tx, rx) = mpsc::channel(10);

        let initial = AppConfig::load(&path_str)
            .await
            .context("Failed to load initial config")?;

        // notify callbacks run on their own OS thread, outside the runtime
        let runtime = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                debug!("Config file changed: {:?}", event.paths);
                let tx = tx.clone();
                let path = path_str.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(RELOAD_DEBOUNCE).await;
                    match AppConfig::load(&path).await {
                        Ok(config) => {
                            info!("Configuration reloaded");
                            if tx.send(config).await.is_err() {
                                debug!("Config receiver dropped");
                            }
                        },
                        Err(e) => warn!("Failed to reload config (keeping old config): {:#}", e),
                    }
                });
            },
            Ok(_) => {},
            Err(e) => error!("Watch error: {}", e),
        })?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", path.display()))?;

        info!("Watching {} for changes", path.display());

        Ok((
            Self {
                _watcher: watcher,
                rx,
                path,
            },
            initial,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next valid config; None once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}
