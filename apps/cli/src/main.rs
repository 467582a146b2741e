//! deckgen CLI — batch presentation generation.
//!
//! Turns student records, sales data, and company websites into slide decks
//! through a Presenton-compatible presentation service.

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
