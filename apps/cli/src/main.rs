//! planindex CLI — transparency-in-coverage plan index builder.
//!
//! Fetches organization index documents concurrently, builds the two
//! lookup indexes, and answers point queries against the persisted
//! artifacts.

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
