use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;

use strangerbot_admin::admin::{CommandRouter, DEFAULT_COMMAND_TIMEOUT};
use strangerbot_admin::config::default_config_path;
use strangerbot_admin::console::{self, ConsoleSessions};
use strangerbot_admin::stranger::InMemoryStrangerService;
use strangerbot_admin::{logging, BotError, Configuration};

/// Admin console for the random-chat pairing bot.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database password, overrides the configuration file
    #[arg(long)]
    database_password: Option<String>,

    /// Bot token, overrides the configuration file
    #[arg(long)]
    token: Option<String>,

    /// Chat the console speaks for (defaults to the first admin)
    #[arg(long)]
    chat_id: Option<i64>,

    /// Stranger to register in the in-memory registry (repeatable)
    #[arg(long = "stranger")]
    strangers: Vec<i64>,

    /// Seconds a single command may run
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Overrides may also come from .env or the environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    // Default filter until the configuration says otherwise
    let log_handle = logging::init()?;

    let database_password = cli
        .database_password
        .or_else(|| std::env::var("STRANGERBOT_DATABASE_PASSWORD").ok());
    let token = cli
        .token
        .or_else(|| std::env::var("STRANGERBOT_TOKEN").ok());
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let config = Configuration::load(&config_path, database_password, token)
        .map_err(BotError::from)?;
    log_handle.apply(&config.logging)?;

    info!("Loaded configuration from {}", config_path.display());
    info!(
        "Database {}@{}/{}, {} admin(s)",
        config.database_user,
        config.database_host,
        config.database_name,
        config.admins_telegram_ids.len()
    );

    let chat_id = cli
        .chat_id
        .or_else(|| config.admins_telegram_ids.first().copied())
        .unwrap_or_default();
    let timeout = cli
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT);

    let registry = InMemoryStrangerService::with_strangers(cli.strangers).await;
    let router = CommandRouter::new(
        config.admins_telegram_ids.iter().copied(),
        Arc::new(registry),
        Arc::new(ConsoleSessions::new(tokio::io::stdout())),
        timeout,
    );

    if !router.is_admin(chat_id) {
        info!("Chat {} is not an admin, admin commands will be refused", chat_id);
    }
    info!("Reading commands for chat {} from stdin. Press Ctrl+C to exit.", chat_id);

    tokio::select! {
        result = console::run(&router, chat_id, BufReader::new(tokio::io::stdin())) => result?,
        _ = shutdown_signal() => info!("Shutting down..."),
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
