//! Gatekeep entrypoint.

use anyhow::Context;
use clap::Parser;
use gatekeep_bot::{BotConfig, build_router};
use gatekeep_core::PrincipalId;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod handlers;

use cli::{Commands, ConfigCommands};

#[derive(Parser)]
#[command(name = "gatekeep")]
#[command(author, version, about = "Gatekeep license and payload bot", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./gatekeep.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Console { principal } => {
            let router = build_router(&config)?;
            handlers::console(&router, PrincipalId::new(principal)).await?
        }
        Commands::Exec { principal, command } => {
            let router = build_router(&config)?;
            handlers::exec(&router, PrincipalId::new(principal), &command).await?
        }
        Commands::EncodeFile {
            principal,
            path,
            mime_type,
        } => {
            let router = build_router(&config)?;
            handlers::encode_file(&router, PrincipalId::new(principal), &path, &mime_type).await?
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config),
        },
    }

    Ok(())
}
