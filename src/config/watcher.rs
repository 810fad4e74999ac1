//! Configuration file watcher for hot reload.
//!
//! Watches the directory containing the config file, so a save that renames
//! a new file over the config keeps being seen on every later save.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RouterConfig;

/// Watches a configuration file and publishes every valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watch_dir(&self.path);
        let file_name = match self.path.file_name() {
            Some(name) => name.to_os_string(),
            None => {
                return Err(notify::Error::generic("config path has no file name")
                    .add_path(self.path))
            }
        };

        tracing::info!(dir = %dir.display(), file = ?file_name, "Config watcher started");

        let Self { path, update_tx } = self;
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_file(&event, &file_name) => reload(&path, &update_tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(watcher)
    }
}

/// Directory holding the config file. A bare file name lives in `.`.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True when a create, write or rename event names the config file.
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_create() || event.kind.is_modify())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(OsStr::new(file_name)))
}

fn reload(path: &Path, update_tx: &mpsc::UnboundedSender<RouterConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(routes = config.routes.len(), "Config file changed, publishing update");
            if update_tx.send(config).is_err() {
                tracing::debug!("Config update receiver dropped");
            }
        }
        // Half-written files land here too; the event for the final write retries.
        Err(e) => tracing::warn!(error = %e, "Ignoring invalid config revision"),
    }
}
