//! Change source: filesystem notifications for the watched log file.
//!
//! Bridges the notify watcher thread into tokio through two unbounded
//! channels, one for change events and one for watch-level errors. The
//! dispatcher consumes both; watch errors are reported, never fatal.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context as _, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use tokio::sync::mpsc;

/// Notification that the watched file's content changed. Ephemeral; carries
/// no diff, only "changed since last read".
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Path the filesystem event was reported for.
    pub path: PathBuf,

    /// When the change was observed.
    pub timestamp: SystemTime,
}

/// Guard keeping the underlying notify watcher alive. Dropping it stops
/// the watch and closes both event channels.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

/// Start watching a single file.
///
/// Fails when the file does not exist or the platform watcher cannot attach,
/// which callers treat as a fatal setup error.
pub fn watch(
    path: &Path,
) -> Result<(
    FileWatcher,
    mpsc::UnboundedReceiver<ChangeEvent>,
    mpsc::UnboundedReceiver<notify::Error>,
)> {
    let (change_tx, change_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::unbounded_channel();

    // Debounce bursts of writes; loggers often touch the file several
    // times per append.
    let mut debouncer = new_debouncer(
        Duration::from_millis(100),
        None,
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                for debounced in events {
                    let event = &debounced.event;
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        continue;
                    }
                    if let Some(path) = event.paths.first() {
                        let _ = change_tx.send(ChangeEvent {
                            path: path.clone(),
                            timestamp: SystemTime::now(),
                        });
                    }
                }
            }
            Err(errors) => {
                for err in errors {
                    let _ = error_tx.send(err);
                }
            }
        },
    )?;

    debouncer
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch: {}", path.display()))?;

    Ok((
        FileWatcher {
            _debouncer: debouncer,
        },
        change_rx,
        error_rx,
    ))
}
