//! CLI entry point for pipeline-studio.

pub mod run;

use clap::{Parser, Subcommand};

/// Pipeline Studio CLI
#[derive(Parser, Debug)]
#[command(name = "pipeline-studio", version, about = "Run the provider-data agent pipeline")]
pub struct Cli {
    /// Backend base URL (overrides STUDIO_BASE_URL and the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Seconds to wait for the next chunk before giving up (0 waits forever)
    #[arg(long, global = true)]
    pub idle_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream one pipeline run for a provider
    Run(RunArgs),
    /// Print the effective configuration
    Config,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Provider name
    #[arg(short, long)]
    pub name: String,

    /// National Provider Identifier
    #[arg(long)]
    pub npi: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub specialty: Option<String>,

    /// State license number
    #[arg(long)]
    pub license: Option<String>,

    /// Print the final run as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}
