#![deny(clippy::all, clippy::pedantic)]

use clap::Parser;

use penstroke_cli::args::{Cli, Commands};
use penstroke_cli::client::CliError;
use penstroke_cli::handlers::posts;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Posts(cmd) => posts::handle(&cli, &cmd.action).await?,
    }

    Ok(())
}
