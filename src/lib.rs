//! # Logcast - Live Log File Broadcaster
//!
//! Watches a single growing log file and streams its full current body to
//! every connected WebSocket subscriber whenever the file changes.
//!
//! ## Features
//!
//! - **Full-state updates**: every change re-sends the whole file body, so
//!   a subscriber that misses one update is caught up by the next
//! - **Best-effort delivery**: a failed write drops that subscriber only;
//!   everyone else keeps receiving
//! - **Safe concurrency**: the subscriber registry is the single piece of
//!   shared state and is never exposed raw
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logcast::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(std::path::Path::new("logcast.yml")).await?;
//!     logcast::server::start(config).await
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod registry;
pub mod server;
pub mod watcher;

// Re-export main types for library consumers
pub use broadcast::Dispatcher;
pub use config::Config;
pub use registry::{Registry, Subscriber, SubscriberId};
pub use watcher::{ChangeEvent, FileWatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
