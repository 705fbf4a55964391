mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{handle_ask, handle_chat, handle_ingest, handle_status, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { data_dir } => {
            handle_ingest(data_dir, cli.config.as_deref()).await?;
        }
        Commands::Ask { query, verbose } => {
            handle_ask(query, verbose, cli.config.as_deref()).await?;
        }
        Commands::Chat => {
            handle_chat(cli.config.as_deref()).await?;
        }
        Commands::Status => {
            handle_status(cli.config.as_deref()).await?;
        }
    }

    Ok(())
}
