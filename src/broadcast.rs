//! Broadcast dispatcher: turns one file-change notification into a delivery
//! attempt to every live subscriber.
//!
//! Each event triggers a fresh read of the whole file; there is no history
//! and no diffing. Delivery is best-effort and independent per subscriber:
//! a subscriber whose connection is gone is removed from the registry and
//! will simply miss updates until it reconnects.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::registry::Registry;
use crate::watcher::ChangeEvent;

pub struct Dispatcher {
    registry: Arc<Registry>,
    path: PathBuf,
    show_logs: bool,
}

impl Dispatcher {
    pub fn new(config: &Config, registry: Arc<Registry>) -> Self {
        Self {
            registry,
            path: config.log_file_path.clone(),
            show_logs: config.show_logs,
        }
    }

    /// Consume change events and watch errors until the change stream ends.
    ///
    /// Events are handled one at a time, so a given subscriber sees its own
    /// deliveries in dispatch order. Watch errors are logged and skipped;
    /// they never stop the loop.
    pub async fn run(
        self,
        mut changes: mpsc::UnboundedReceiver<ChangeEvent>,
        mut errors: mpsc::UnboundedReceiver<notify::Error>,
    ) {
        let mut errors_open = true;
        loop {
            tokio::select! {
                change = changes.recv() => {
                    let Some(event) = change else { break };
                    self.dispatch(event).await;
                }
                err = errors.recv(), if errors_open => {
                    match err {
                        Some(err) => tracing::warn!("watcher error: {err}"),
                        None => errors_open = false,
                    }
                }
            }
        }
        tracing::debug!("change stream closed, dispatcher exiting");
    }

    /// Handle a single change event: read the file, push the body to every
    /// subscriber in the current snapshot, prune the ones that are gone.
    async fn dispatch(&self, event: ChangeEvent) {
        let body = match tokio::fs::read(&self.path).await {
            Ok(data) => Bytes::from(data),
            Err(err) => {
                // Transient: the next change event triggers a fresh read.
                tracing::warn!("error reading {}: {err}", self.path.display());
                return;
            }
        };

        if self.show_logs {
            tracing::debug!(
                path = %event.path.display(),
                "sending message: {}",
                String::from_utf8_lossy(&body)
            );
        }

        for subscriber in self.registry.snapshot() {
            if !subscriber.deliver(body.clone()) {
                tracing::debug!(id = subscriber.id, "pruning disconnected subscriber");
                self.registry.remove(subscriber.id);
            }
        }
    }
}
