// crates/ido-daemon/src/main.rs
//
// Binary entrypoint for the IDO rewards daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, replays the
// persisted ledger into a reward book, and runs the notification ingest loop
// until the input ends or Ctrl-C arrives.

mod commands;
mod config;
mod ingest;
mod shared;
mod vault;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};

use config::{expand_tilde, DaemonConfig};
use ido_core::{Address, LedgerStore};
use ido_economics::{PoolHooks, RewardBook};
use ido_store::{InMemoryStore, RocksStore};
use ingest::Ingestor;
use vault::OutboxVault;

/// IDO liquidity rewards daemon.
#[derive(Parser, Debug)]
#[command(name = "ido-daemon", version = "0.1.0", about = "IDO liquidity rewards daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.ido/config.toml")]
    config: String,

    /// Notification source: a file path, or "-" for stdin.
    #[arg(long)]
    input: Option<String>,

    /// Storage backend: rocksdb or memory.
    #[arg(long)]
    storage: Option<String>,

    /// Hex address of the authorized pool runtime.
    #[arg(long)]
    runtime: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing subscriber. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    let mut daemon_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI flags override the config file values.
    if let Some(input) = args.input {
        daemon_config.input = input;
    }
    if let Some(storage) = args.storage {
        daemon_config.storage = storage;
    }
    if let Some(runtime) = args.runtime {
        daemon_config.authorized_runtime = Some(runtime);
    }

    tracing::info!("IDO Rewards Daemon v0.1.0");
    tracing::info!("Storage backend: {}", daemon_config.storage);
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!("Input: {}", daemon_config.input);

    let runtime: Address = daemon_config
        .authorized_runtime
        .as_deref()
        .ok_or("No authorized pool runtime configured (set authorized_runtime or --runtime)")?
        .parse()?;
    tracing::info!("Authorized pool runtime: {}", runtime);

    // ---------------------------------------------------------------
    // Storage and ledger replay
    // ---------------------------------------------------------------
    let store: Arc<dyn LedgerStore> = match daemon_config.storage.as_str() {
        "memory" => {
            tracing::warn!("Using in-memory storage; state is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        "rocksdb" => {
            let data_dir = expand_tilde(&daemon_config.data_dir);
            std::fs::create_dir_all(&data_dir)?;
            let db_path = format!("{}/ledger", data_dir);
            let store = RocksStore::open(&db_path)?;
            tracing::info!("Ledger store opened at {}", db_path);
            Arc::new(store)
        }
        other => return Err(format!("Unknown storage backend: {}", other).into()),
    };

    let book = RewardBook::open(store)?;
    if let Err(e) = book.verify_invariants() {
        tracing::error!("Replayed ledger failed invariant check, refusing to start: {}", e);
        return Err(e.into());
    }
    let campaign_count = book.campaigns().count();
    tracing::info!(
        "Reward book ready: {} campaigns, {} outstanding shares, {} undelivered escrow requests",
        campaign_count,
        book.total_shares(),
        book.pending_escrow().len()
    );

    let vault = Arc::new(OutboxVault::open(&expand_tilde(&daemon_config.outbox_path))?);
    let ingestor = Ingestor::new(shared::share(book), PoolHooks::new(runtime), vault);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = if daemon_config.input == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let path = expand_tilde(&daemon_config.input);
        Box::new(BufReader::new(tokio::fs::File::open(&path).await?))
    };

    let stats = ingestor.run(reader).await?;
    tracing::info!(
        "Daemon shutting down after {} commands",
        stats.applied + stats.rejected + stats.malformed
    );
    Ok(())
}
