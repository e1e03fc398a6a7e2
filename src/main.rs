//! pipeline-studio CLI binary entry point.

use clap::Parser;
use pipeline_studio::cli::{run, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match run::resolve_config(&cli) {
        Ok(config) => match cli.command {
            Commands::Run(args) => run::handle_run(&config, args).await.map(|_| ()),
            Commands::Config => {
                run::handle_config(&config);
                Ok(())
            }
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
