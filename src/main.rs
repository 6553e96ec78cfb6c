//! quotewatch entry point
//!
//! 1. Loads the subscriber roster from YAML
//! 2. Seeds the store and starts one monitor per subscriber
//! 3. Runs until Ctrl+C, then shuts every monitor down cleanly
//!
//! # Environment Variables
//! - `QUOTEWATCH_CONFIG`: roster file path (default: `watch.yaml`)
//! - `QUOTEWATCH_STATE`: JSON snapshot path (default: `quotewatch_state.json`)
//! - `LOG_FORMAT` / `RUST_LOG`: see `config::logging`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use quotewatch::config::{self, logging::init_logging};
use quotewatch::core::{LastObservationTable, MonitorContext, MonitorSupervisor};
use quotewatch::notify::LogSink;
use quotewatch::source::SimulatedSource;
use quotewatch::store::{JsonStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    init_logging();

    let config_path =
        std::env::var("QUOTEWATCH_CONFIG").unwrap_or_else(|_| "watch.yaml".to_string());
    let state_path = PathBuf::from(
        std::env::var("QUOTEWATCH_STATE").unwrap_or_else(|_| "quotewatch_state.json".to_string()),
    );

    info!(path = %config_path, "Loading subscriber roster");
    let roster = match config::load_config(Path::new(&config_path)) {
        Ok(cfg) => {
            info!(subscribers = cfg.subscribers.len(), "Roster loaded");
            cfg
        }
        Err(e) => {
            error!(error = %e, "Configuration failed");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn Store> = Arc::new(JsonStore::open(state_path)?);
    for subscriber in roster.subscribers {
        store.upsert_subscriber(subscriber).await?;
    }

    // Simulated quote backend; swap in a live QuoteSource here to track a
    // real market feed.
    let ctx = MonitorContext {
        source: Arc::new(SimulatedSource::new()),
        store,
        sink: Arc::new(LogSink::new()),
        table: Arc::new(LastObservationTable::new()),
    };
    let supervisor = MonitorSupervisor::new(ctx);

    let started = supervisor.bootstrap_all().await?;
    info!(monitors = started, "Monitoring started");

    match signal::ctrl_c().await {
        Ok(()) => info!("Graceful shutdown initiated"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }

    supervisor.shutdown_all().await;
    info!("Clean exit");
    Ok(())
}
