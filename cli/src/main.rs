use clap::Parser;

use image_gateway_core::config::load_config_with_source;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config comes first so [logging] level can seed the filter; RUST_LOG still wins
    let (config, source) = load_config_with_source(cli.config.clone())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.filter_directives())),
        )
        .init();

    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Start { host, port } => {
            cli::commands::start::run(config, host, port).await?;
        }
        Commands::Status => {
            cli::commands::status::run(config, source).await?;
        }
        Commands::List { prefix, limit } => {
            cli::commands::list::run(config, prefix, limit).await?;
        }
    }

    Ok(())
}
