//! Vigiles CLI - companion for the Vigiles vulnerability monitoring platform

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod output;
mod scan;

use cli::{Cli, Commands};
use error::Result;
use output::Diag;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let diag = Diag::new(cli.debug);

    match cli.command {
        Commands::Scan(args) => scan::runner::run(args, cli.config.as_deref(), diag).await,
        Commands::Version => {
            println!("vigiles version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
