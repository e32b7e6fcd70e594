//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL, contract)
//!     → wallet.rs (key loading)
//!     → client.rs (wallet-filling RPC connection with timeouts)
//!     → transaction.rs (encode, call / sign, broadcast, confirm)
//!     → registry.rs (contract bindings behind the ContentLedger trait)
//!
//! memory.rs implements the same trait without a chain.
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or RPC URLs (they can carry API keys)
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod memory;
pub mod registry;
pub mod transaction;
pub mod types;
pub mod wallet;

use std::sync::Arc;

pub use client::ChainClient;
pub use memory::MemoryLedger;
pub use registry::{ContentLedger, OnChainLedger};
pub use types::{
    AttestationRecord, BlockchainConfig, BlockchainError, BlockchainResult, ChainId, LedgerInfo,
    ReportStatus, TxOutcome,
};
pub use wallet::Wallet;

/// Build the ledger selected by `config.enabled`.
///
/// The on-chain ledger needs a signer key in the environment; the memory
/// ledger falls back to a random key when none is set.
pub async fn build_ledger(config: &BlockchainConfig) -> BlockchainResult<Arc<dyn ContentLedger>> {
    if config.enabled {
        let wallet = Wallet::from_env()?;
        let ledger = OnChainLedger::connect(config.clone(), &wallet).await?;
        Ok(Arc::new(ledger))
    } else {
        let wallet = Wallet::from_env().unwrap_or_else(|_| Wallet::random());
        tracing::warn!(
            signer = %wallet.address(),
            "Blockchain disabled; using in-memory ledger, nothing is written on-chain"
        );
        Ok(Arc::new(MemoryLedger::new(wallet.address(), config.chain_id)))
    }
}
