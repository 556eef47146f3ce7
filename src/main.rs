use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use logcast::Config;

#[derive(Parser)]
#[command(name = "logcast")]
#[command(
    about = "Streams the full body of a watched log file to WebSocket subscribers on every change",
    version
)]
struct Cli {
    /// Path to the YAML configuration file
    config: PathBuf,

    /// Override the listen port from the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the watched log file path
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Force verbose logging regardless of the configuration file
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config).await?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(file) = cli.file {
        config.log_file_path = file;
    }
    if cli.verbose {
        config.show_logs = true;
    }

    let default_filter = if config.show_logs {
        "logcast=debug"
    } else {
        "logcast=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    println!(
        "{} Watching {}",
        "👁".bright_cyan(),
        config.log_file_path.display().to_string().bright_yellow()
    );

    logcast::server::start(config).await
}
