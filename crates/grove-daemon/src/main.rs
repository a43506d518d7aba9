// crates/grove-daemon/src/main.rs
//
// Binary entrypoint for the Grove ledger daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration, restores
// the ledger from RocksDB (or creates it), then serves line-delimited JSON
// commands on stdin and writes one JSON response per line to stdout.
// Logs go to stderr so stdout carries responses only.

mod commands;
mod config;
mod persist;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use commands::Response;
use config::DaemonConfig;
use grove_core::traits::SnapshotStore;
use grove_ledger::SharedLedger;
use grove_store::RocksLedgerStore;
use persist::Persister;

/// Grove ledger daemon: serves the incentive ledger over a JSON line protocol.
#[derive(Parser, Debug)]
#[command(name = "grove-daemon", version = "0.1.0", about = "Grove incentive ledger daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.grove/config.toml")]
    config: String,

    /// Override the configured data directory.
    #[arg(long)]
    data_dir: Option<String>,

    /// Keep the ledger in memory only.
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults only if the
    // file does not exist. A file that fails to parse or validate stops startup.
    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path)?;
    let found = loaded.is_some();
    let mut daemon_config = loaded.unwrap_or_default();
    if let Some(dir) = args.data_dir {
        daemon_config.data_dir = dir;
    }
    if args.ephemeral {
        daemon_config.persist = false;
    }

    // Initialize tracing subscriber for structured logging. RUST_LOG wins over
    // the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    if found {
        tracing::info!("Loaded configuration from {}", config_path);
    } else {
        tracing::warn!("No config file at {}. Using defaults.", config_path);
    }

    let owner = daemon_config.owner_principal();
    tracing::info!("Grove Ledger Daemon v0.1.0");
    tracing::info!("Owner: {}", owner);
    tracing::info!("Persistence: {}", daemon_config.persist);

    // Open the store and restore the ledger.
    let (ledger, mut persister) = if daemon_config.persist {
        let data_dir = expand_tilde(&daemon_config.data_dir);
        let db_path = format!("{}/ledger_rocksdb", data_dir);
        let store: Arc<dyn SnapshotStore> = Arc::new(RocksLedgerStore::open(&db_path)?);
        tracing::info!("Ledger store opened at {}", db_path);
        let ledger = persist::load_ledger(store.as_ref(), owner, daemon_config.ledger.clone())?;
        let next_seq = ledger.next_event_seq();
        (ledger, Some(Persister::new(store, next_seq)))
    } else {
        let ledger = grove_ledger::IncentiveLedger::new(owner, daemon_config.ledger.clone())?;
        (ledger, None)
    };

    tracing::info!(
        total_supply = ledger.total_supply(),
        max_supply = ledger.max_supply(),
        claims = ledger.total_claims(),
        "Ledger ready"
    );
    let shared = SharedLedger::new(ledger);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut unpersisted = false;
        let result = match commands::parse_line(line) {
            Ok(command) => {
                let mutation = command.is_mutation();
                let archive = persister.as_ref().map(Persister::store);
                let result = commands::dispatch(&shared, archive, command).await;
                match persister.as_mut() {
                    Some(persister) if mutation && result.is_ok() => {
                        let confirmed = persister.confirm(&shared, result).await;
                        unpersisted = confirmed.is_err();
                        confirmed
                    }
                    _ => result,
                }
            }
            Err(e) => Err(e),
        };

        let mut out = serde_json::to_vec(&Response::from(result))?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;

        // Memory is now ahead of the store; serving further requests would
        // acknowledge state that a restart loses.
        if unpersisted {
            tracing::error!("Ledger store unavailable; shutting down");
            return Err("ledger store unavailable".into());
        }
    }

    tracing::info!("Input closed; shutting down");
    Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
