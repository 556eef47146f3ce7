//! YAML configuration for the broadcaster.
//!
//! Loaded once at startup and passed by reference into the server and the
//! dispatcher. There is no mutable global configuration state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Deserialize;

/// Immutable runtime configuration, read from a YAML file.
///
/// Keys are camelCase to stay compatible with existing config files:
///
/// ```yaml
/// port: 8080
/// logFilePath: /var/log/app.log
/// showLogs: true
/// sendTimeoutMs: 500
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// TCP port the HTTP/WebSocket listener binds to.
    pub port: u16,

    /// Path of the single log file to watch and broadcast.
    pub log_file_path: PathBuf,

    /// Log every outgoing message body at debug level.
    #[serde(default)]
    pub show_logs: bool,

    /// Optional per-subscriber write timeout in milliseconds. A WebSocket
    /// write that takes longer drops that subscriber. Unset means no
    /// timeout: a slow-but-healthy client stalls only its own delivery.
    #[serde(default)]
    pub send_timeout_ms: Option<u64>,
}

impl Config {
    /// Read and parse the configuration file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&raw)
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// The configured write timeout, if any.
    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout_ms.map(Duration::from_millis)
    }
}
