//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lmgate_cli::{Cli, Commands, handlers};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so it feeds the env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Serve(args) => handlers::serve::execute(args).await,
        Commands::Models(args) => handlers::models::execute(args).await,
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
