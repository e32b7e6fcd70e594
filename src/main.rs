//! Content notary service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                  CONTENT NOTARY                    │
//!                      │                                                    │
//!   Client Request     │  ┌─────────┐    ┌──────────┐    ┌──────────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│ content  │───▶│  blockchain  │──┼──▶ RPC node
//!                      │  │ server  │    │  digest  │    │   ledger     │  │    (registry
//!                      │  └────┬────┘    └──────────┘    └──────┬───────┘  │     contract)
//!                      │       │                                │          │
//!   Client Response    │  ┌────▼─────┐   ┌──────────┐           │          │
//!   ◀──────────────────┼──│ response │◀──│ qr code  │◀──────────┘          │
//!                      │  └──────────┘   └──────────┘    tx hash           │
//!                      │                                                    │
//!                      │  config · observability · lifecycle · admin        │
//!                      └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use content_notary::config::load_config;
use content_notary::lifecycle::startup;
use content_notary::observability::logging;

#[derive(Parser)]
#[command(name = "content-notary")]
#[command(about = "Registers document hashes on-chain and serves auditor attestations", long_about = None)]
struct Args {
    /// TOML config file. Falls back to `NOTARY_CONFIG`, then to defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine.
    let _ = dotenv::dotenv();

    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var_os("NOTARY_CONFIG").map(PathBuf::from));

    let config = load_config(config_path.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "content-notary starting");
    startup::launch(config).await?;
    Ok(())
}
