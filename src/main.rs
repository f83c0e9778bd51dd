mod cli;
mod config;
mod error;
mod guard;
mod logging;
mod model;
mod orchestrator;
mod supervisor;
mod timer;
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    if let Some(path) = logging::init() {
        tracing::info!(log = %path.display(), version = env!("CARGO_PKG_VERSION"), "starting");
    }

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Returning the error from main prints it and exits with code 1.
            tracing::error!(error = format!("{e:#}"), "unrecoverable error");
            Err(e)
        }
    }
}
