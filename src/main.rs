use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Resolve(args)) => {
            command::run_resolve(args).await?;
        }
        Some(Commands::Validate { file }) => {
            command::run_validate(&file).await?;
        }
        Some(Commands::Schema) => {
            command::run_schema().await?;
        }
        None => {
            // No command specified, show help
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Use 'viewer-config resolve --query \"?config=<url>\"' to resolve a config.");
        }
    }

    Ok(())
}
