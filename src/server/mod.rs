pub mod api;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::broadcast::Dispatcher;
use crate::config::Config;
use crate::registry::Registry;
use crate::watcher;

/// Start the broadcaster: attach the file watcher, spawn the dispatcher,
/// then serve HTTP/WebSocket until the process exits.
///
/// Setup failures (watch attach, port bind) propagate out; everything after
/// startup is handled locally and is never fatal.
pub async fn start(config: Config) -> Result<()> {
    let registry = Arc::new(Registry::new());

    let (watcher, changes, errors) = watcher::watch(&config.log_file_path)
        .with_context(|| format!("cannot watch {}", config.log_file_path.display()))?;

    let dispatcher = Dispatcher::new(&config, registry.clone());
    tokio::spawn(dispatcher.run(changes, errors));

    let result = api::serve(&config, registry).await;

    // The watcher guard lives for the whole serve call.
    drop(watcher);
    result
}
