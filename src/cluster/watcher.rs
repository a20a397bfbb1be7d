//! Snapshot file watcher.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::cluster::snapshot::{load_snapshot, ClusterSnapshot};

/// Watches a snapshot file and emits each successfully reloaded snapshot.
pub struct SnapshotWatcher {
    path: PathBuf,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<ClusterSnapshot>,
}

impl SnapshotWatcher {
    /// Create a new SnapshotWatcher.
    ///
    /// Returns the watcher and a receiver for reloaded snapshots.
    pub fn new(
        path: &Path,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ClusterSnapshot>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Events stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::debug!(path = ?path, "Snapshot change detected, reloading");
                        match load_snapshot(&path) {
                            Ok(snapshot) => {
                                let _ = tx.send(snapshot);
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Failed to reload snapshot. Keeping current cluster state."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Snapshot watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Snapshot watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_emits_reloaded_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"items": []}"#).unwrap();

        let (watcher, mut rx) = SnapshotWatcher::new(file.path(), Duration::from_millis(100));
        let _guard = watcher.run().unwrap();

        std::fs::write(
            file.path(),
            r#"{"items": [{"kind": "Proxy", "metadata": {"name": "cluster"}}]}"#,
        )
        .unwrap();

        // A single write can surface as several events; wait for one carrying the proxy.
        let snapshot = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let snapshot = rx.recv().await.unwrap();
                if snapshot.proxies().count() == 1 {
                    return snapshot;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(snapshot.items.len(), 1);
    }

    #[test]
    fn test_missing_file_fails_to_watch() {
        let (watcher, _rx) =
            SnapshotWatcher::new(Path::new("/nonexistent/cluster.json"), Duration::from_secs(1));
        assert!(watcher.run().is_err());
    }
}
