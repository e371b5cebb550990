//! Vigil verification service: entry point.
//!
//! Starts the HTTP verification service with configuration from a TOML file
//! or defaults.

mod api;
mod config;
mod state;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::VigilConfig;
use state::AppState;
use vigil_verifier::VerificationEngine;

/// Vigil verification service
#[derive(Parser, Debug)]
#[command(name = "vigil-node", version, about = "Vigil verification service")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "vigil.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the ledger snapshot path.
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a config with the known circuits and fresh keys, then exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        init_tracing(args.log_level.as_deref().unwrap_or("info"), "text");
        let config = VigilConfig::generate();
        config.save(&args.config)?;
        tracing::info!(
            path = %args.config.display(),
            circuits = config.circuits.len(),
            "wrote default config"
        );
        return Ok(());
    }

    // Load configuration
    let mut config = VigilConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(ledger) = args.ledger {
        config.ledger.snapshot_path = Some(ledger);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging.level, &config.logging.format);
    tracing::info!("Vigil verification service v{}", env!("CARGO_PKG_VERSION"));

    let ledger = config.ledger.open()?;

    let (_admin, handle) = config.build_settings()?;
    if handle.snapshot().circuits().is_empty() {
        tracing::warn!("no circuits configured; every verification will be rejected");
    }
    let state = Arc::new(AppState::new(VerificationEngine::new(handle), ledger));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("received shutdown signal");
    };

    let api_addr = config.api_addr();
    tokio::select! {
        result = api::start_api_server(&api_addr, state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "API server error");
                return Err(e);
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    tracing::info!("Vigil service exited cleanly");
    Ok(())
}
