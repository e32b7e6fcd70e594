use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

use content_notary::config::ObservabilityConfig;
use content_notary::content::HashAlgorithm;
use content_notary::observability::logging;
use content_notary::telemetry::EsgReading;
use notary_sdk::{NotaryClient, UploadOutcome};

#[derive(Parser)]
#[command(name = "notary-cli")]
#[command(about = "Client for the content notary API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "NOTARY_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and register its hash
    Upload { path: PathBuf },
    /// Check whether a hash is registered
    Verify { hash: String },
    /// Current attestation state of a hash
    Status { hash: String },
    /// Attestation history of a hash
    History { hash: String },
    /// Attest a registered report
    Attest {
        hash: String,
        #[arg(long)]
        passed: bool,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Revoke the active attestation
    Revoke {
        hash: String,
        #[arg(long, default_value = "revoked")]
        reason: String,
    },
    /// Service and chain health
    Health,
    /// Allow (or with --deny, remove) an auditor address
    Auditor {
        address: String,
        #[arg(long)]
        deny: bool,
        #[arg(short, long, env = "NOTARY_ADMIN_KEY")]
        key: String,
    },
    /// Print the content hash of a local file without contacting the server
    Hash {
        path: PathBuf,
        #[arg(long, default_value = "keccak256")]
        algorithm: HashAlgorithm,
    },
    /// Upload simulated ESG telemetry readings on an interval
    Simulate {
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
        /// Stop after this many readings; runs until interrupted otherwise
        #[arg(long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = NotaryClient::new(&cli.url);

    match cli.command {
        Commands::Upload { path } => {
            let bytes = tokio::fs::read(&path).await?;
            let outcome = client.upload(&file_name(&path), bytes).await?;
            print_json(&upload_summary(&outcome))?;
        }
        Commands::Verify { hash } => {
            let exists = client.verify(&hash).await?;
            print_json(&json!({ "hash": hash, "exists": exists }))?;
        }
        Commands::Status { hash } => print_json(&client.status(&hash).await?)?,
        Commands::History { hash } => print_json(&client.history(&hash).await?)?,
        Commands::Attest { hash, passed, reason } => {
            print_json(&client.attest(&hash, passed, &reason).await?)?
        }
        Commands::Revoke { hash, reason } => print_json(&client.revoke(&hash, &reason).await?)?,
        Commands::Health => print_json(&client.health().await?)?,
        Commands::Auditor { address, deny, key } => {
            print_json(&client.set_auditor(&key, &address, !deny).await?)?
        }
        Commands::Hash { path, algorithm } => {
            let bytes = tokio::fs::read(&path).await?;
            let digest = algorithm.digest(&bytes);
            print_json(&json!({
                "file": path.display().to_string(),
                "algorithm": algorithm.as_str(),
                "hash": digest.to_hex(),
            }))?;
        }
        Commands::Simulate {
            interval_secs,
            count,
        } => {
            logging::init_logging(&ObservabilityConfig::default());
            simulate(&client, Duration::from_secs(interval_secs.max(1)), count).await;
        }
    }

    Ok(())
}

/// Upload one reading per tick. Failed uploads are logged and the loop goes on.
async fn simulate(client: &NotaryClient, interval: Duration, count: Option<u64>) {
    let mut ticker = tokio::time::interval(interval);
    let mut sent = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(sent, "Simulation interrupted");
                return;
            }
        }

        let reading = EsgReading::sample();
        let document = match reading.to_document() {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(error = %e, "Cannot serialize reading");
                continue;
            }
        };
        let name = format!("esg-{}.json", reading.timestamp.timestamp_millis());

        match client.upload(&name, document).await {
            Ok(UploadOutcome::Registered(receipt)) => tracing::info!(
                file_hash = %receipt.file_hash,
                tx_hash = %receipt.transaction_id,
                link = %receipt.transaction_link,
                "Reading registered"
            ),
            Ok(UploadOutcome::AlreadyRegistered { file_hash }) => {
                tracing::warn!(file_hash = %file_hash, "Reading already registered")
            }
            Err(e) => tracing::error!(error = %e, "Upload failed"),
        }

        sent += 1;
        if count.is_some_and(|limit| sent >= limit) {
            tracing::info!(sent, "Simulation finished");
            return;
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

fn upload_summary(outcome: &UploadOutcome) -> Value {
    match outcome {
        UploadOutcome::Registered(receipt) => json!({
            "registered": true,
            "fileHash": receipt.file_hash,
            "transactionId": receipt.transaction_id,
            "transactionLink": receipt.transaction_link,
        }),
        UploadOutcome::AlreadyRegistered { file_hash } => json!({
            "registered": false,
            "alreadyRegistered": true,
            "fileHash": file_hash,
        }),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
