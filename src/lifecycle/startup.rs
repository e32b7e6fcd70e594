//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, ledger)
//! - Bind the listener and begin accepting traffic
//! - Tie OS signals to the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::blockchain::{build_ledger, BlockchainError};
use crate::config::NotaryConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Blockchain setup failed: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("Metrics setup failed: {0}")]
    Metrics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start every subsystem for `config` and serve until a shutdown signal.
pub async fn launch(config: NotaryConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        blockchain_enabled = config.blockchain.enabled,
        chain_id = config.blockchain.chain_id,
        hash_algorithm = %config.upload.hash_algorithm,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e| StartupError::Metrics(format!("invalid metrics address: {}", e)))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let ledger = build_ledger(&config.blockchain).await?;
    let info = ledger.info();
    tracing::info!(backend = info.backend, signer = %info.signer, "Ledger ready");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    HttpServer::new(config, ledger)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
