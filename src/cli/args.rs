use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use viewer_configurator::source::{ENV_BASE_URL, ENV_DEFAULT_CONFIG_URL, ENV_QUERY};

/// viewer-config - resolve and validate viewer widget configurations
#[derive(Parser)]
#[command(name = "viewer-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full resolution pipeline and report what the viewer would receive
    Resolve(ResolveArgs),
    /// Validate a config file against the bundled schema
    Validate {
        /// Path to a JSON config file
        file: PathBuf,
    },
    /// Print the bundled schema document
    Schema,
}

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// Explicit config file; takes precedence over every other source
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Query string of the hosting page, e.g. "?config=https://example.com/cfg.json"
    #[arg(short, long, env = ENV_QUERY)]
    pub query: Option<String>,

    /// Default config URL
    #[arg(long, env = ENV_DEFAULT_CONFIG_URL)]
    pub default_url: Option<String>,

    /// Default config file, used when no other source applies
    #[arg(long)]
    pub default_config: Option<PathBuf>,

    /// Base URL for relative `config` query values
    #[arg(long, env = ENV_BASE_URL)]
    pub base_url: Option<String>,

    /// Pretend the viewer is embedded in a foreign page
    #[arg(long)]
    pub embedded: bool,

    /// Refuse to run when embedded
    #[arg(long)]
    pub deny_embed: bool,
}
