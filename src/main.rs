mod auth;
mod cli;
mod clone;
mod config;
mod error;
mod host;
mod output;
mod providers;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting gitquery");
    cli.execute().await?;

    Ok(())
}
