//! bismillah-bot - Telegram bot entry point
//!
//! Startup sequence:
//! 1. Load bootstrap config, resolve the data folder and initialize logging
//! 2. Load and validate the corpus (fatal on any missing verse)
//! 3. Open the session database
//! 4. Poll Telegram until shutdown or a fatal error

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use bismillah_common::config::{
    resolve_relative, DataFolderResolver, TomlConfig, DATA_FOLDER_ENV, TOKEN_ENV,
};
use bismillah_common::db::{init_database, KvStore};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bismillah_bot::assets::AssetCache;
use bismillah_bot::dispatcher::Dispatcher;
use bismillah_bot::feedback::FeedbackLog;
use bismillah_bot::poller;
use bismillah_bot::quran::Quran;
use bismillah_bot::session::SessionStore;
use bismillah_bot::telegram::TelegramClient;

/// Command-line arguments for bismillah-bot
#[derive(Parser, Debug)]
#[command(name = "bismillah-bot")]
#[command(about = "Explore the Noble Qur'an on Telegram")]
#[command(version)]
struct Args {
    /// Bootstrap configuration file
    #[arg(short, long, default_value = "bismillah.toml")]
    config: PathBuf,

    /// Folder with corpus files and rendered assets
    #[arg(short, long, env = DATA_FOLDER_ENV)]
    data_folder: Option<PathBuf>,

    /// Telegram Bot API token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// SQLite database path (overrides the config file)
    #[arg(long)]
    database: Option<PathBuf>,
}

fn init_tracing(config: &TomlConfig, data_folder: &std::path::Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.logging.level)));

    match &config.logging.file {
        Some(path) => {
            let path = resolve_relative(data_folder, path);
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(&args.config).context("Failed to load configuration")?;
    let data_folder = DataFolderResolver::new(args.data_folder.clone(), &config).resolve();

    init_tracing(&config, &data_folder)?;

    info!("Starting {}", bismillah_bot::build_banner());
    config.log_source();
    info!("Data folder: {}", data_folder.display());

    let token = config.resolve_token(args.token.as_deref())?;

    let quran = Arc::new(
        Quran::load(&data_folder, &config.corpus).context("Failed to load the Qur'an corpus")?,
    );
    info!("✓ Corpus loaded ({} surahs)", quran.surah_names.len());

    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.database_path(&data_folder));
    let pool = init_database(&db_path)
        .await
        .context("Failed to open session database")?;
    let kv = KvStore::new(pool, config.namespace.clone());
    kv.purge_expired().await?;
    info!("✓ Session database ready: {}", db_path.display());

    let store = SessionStore::new(kv);
    let assets = AssetCache::new(store.clone(), data_folder.clone());
    let feedback = FeedbackLog::new(resolve_relative(&data_folder, &config.feedback_file));
    let dispatcher = Dispatcher::new(quran, store, assets, feedback, &config.bot_username);

    let client = TelegramClient::new(&token).context("Failed to create Telegram client")?;

    poller::run(&client, &dispatcher, config.poll_timeout_secs, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
