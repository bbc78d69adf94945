//! aievents CLI: keeps the published AI events catalog up to date.
//!
//! Gathers candidate events from the curated list, local files, and feeds,
//! and merges the net-new ones into the catalog document.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
