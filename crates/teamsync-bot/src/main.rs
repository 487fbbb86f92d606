//! Teamsync - one-shot Discord team channel provisioner.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use teamsync_bot::{BotError, SessionOutcome, TeamSyncBot};
use teamsync_config::{ConfigLoader, DEFAULT_ENV_FILE};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dotenv file read before the process environment (missing file is ignored)
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ConfigLoader::new().env_file(args.env_file).load() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting bot...");
    match TeamSyncBot::new(config).run().await {
        Ok(SessionOutcome::Completed(_)) => info!("Script has finished."),
        Ok(SessionOutcome::GuildNotFound(_) | SessionOutcome::Panicked) => {
            info!("Script has finished without provisioning.");
        }
        Err(BotError::InvalidToken) => {
            error!("Login failed. The DISCORD_TOKEN is likely invalid.");
        }
        Err(e) => error!("An unexpected error occurred: {e}"),
    }

    ExitCode::SUCCESS
}
