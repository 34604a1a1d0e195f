//! iouvault - durable store for iou obligation records

use clap::Parser;
use color_eyre::eyre::Result;
use iouvault::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Migrate(cmd) => cmd.run().await,
        Command::Schema(cmd) => cmd.run().await,
        Command::Ious(cmd) => cmd.run().await,
    }
}
