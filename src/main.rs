use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Target;

use gazetype::config::{AppConfig, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from(Cli::parse());

    // Logging goes to a file: the UI owns stderr for the session lifetime.
    let log_file = File::create(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("gazetype starting up (service at {})", config.backend_url);

    gazetype::run(config).await
}
