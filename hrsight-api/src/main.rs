//! HOST-RESOURCES-MIB HTTP API.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hrsight_api::{ApiConfig, HttpServer};
use hrsight_common::init_tracing;
use hrsight_snmp::Snmp2Connector;
use tokio::sync::watch;
use tracing::{error, info};

/// HTTP API serving SNMP host-resources tables.
#[derive(Parser, Debug)]
#[command(name = "hrsight-api")]
#[command(about = "Serve HOST-RESOURCES-MIB tables read over SNMP as JSON")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ApiConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ApiConfig::default(),
    };

    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    config.logging = config.logging.with_level(args.log_level);
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hrsight API");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_server = HttpServer::new(Snmp2Connector, &config)?;
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    shutdown_tx.send(true)?;

    if tokio::time::timeout(Duration::from_secs(5), http_task)
        .await
        .is_err()
    {
        error!("HTTP server did not stop in time");
    }

    info!("hrsight API stopped");
    Ok(())
}

/// Resolve on SIGTERM; never resolves where the signal is unavailable.
async fn terminate() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        std::future::pending::<()>().await;
    }
}
