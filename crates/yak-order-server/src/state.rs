use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use yak_order_core::cache::ReadCache;
use yak_order_core::observer::{OrderObserver, OrderUpdated};
use yak_order_core::paths;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub cache: Arc<ReadCache>,
    pub event_tx: broadcast::Sender<OrderUpdated>,
    /// Held for the whole of each renumber or single-item edit.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        let (tx, _) = broadcast::channel(64);
        let state = Self {
            root,
            cache: Arc::new(ReadCache::new()),
            event_tx: tx,
            write_lock: Arc::new(Mutex::new(())),
        };

        // Clear resolved reads when catalog.yaml or config.yaml changes on disk.
        // Requires a Tokio runtime.
        if tokio::runtime::Handle::try_current().is_ok() {
            let watched = [
                paths::catalog_path(&state.root),
                paths::config_path(&state.root),
            ];
            let cache = state.cache.clone();
            tokio::spawn(async move {
                let mut last_mtimes = [None::<std::time::SystemTime>; 2];
                loop {
                    tokio::time::sleep(std::time::Duration::from_millis(800)).await;
                    let mut changed = false;
                    for (file, last) in watched.iter().zip(last_mtimes.iter_mut()) {
                        let Ok(mtime) = tokio::fs::metadata(file).await.and_then(|m| m.modified())
                        else {
                            continue;
                        };
                        changed |= last.is_some_and(|prev| prev != mtime);
                        *last = Some(mtime);
                    }
                    if changed {
                        match cache.clear() {
                            Ok(n) => tracing::debug!(dropped = n, "project files changed, cache cleared"),
                            Err(e) => tracing::warn!("failed to clear read cache: {e}"),
                        }
                    }
                }
            });
        }

        state
    }

    /// Observer that forwards order updates onto `event_tx`.
    pub fn broadcaster(&self) -> BroadcastObserver {
        BroadcastObserver {
            tx: self.event_tx.clone(),
        }
    }
}

/// Bridges core order updates onto the SSE broadcast channel.
pub struct BroadcastObserver {
    tx: broadcast::Sender<OrderUpdated>,
}

impl OrderObserver for BroadcastObserver {
    fn order_updated(&self, event: &OrderUpdated) {
        // No subscribers is not an error.
        let _ = self.tx.send(event.clone());
    }
}
