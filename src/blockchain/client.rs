//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint with a signing wallet attached
//! - Query chain state (chain id, block number)
//! - Handle timeouts and network errors gracefully

use std::future::IntoFuture;
use std::time::Duration;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::blockchain::wallet::Wallet;

/// Blockchain RPC client wrapper.
#[derive(Clone)]
pub struct ChainClient {
    /// Wallet-filling provider (nonce, gas, chain id, signature).
    provider: DynProvider,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new blockchain client.
    ///
    /// The chain id is checked against configuration; a mismatch or an
    /// unreachable node is logged and does not fail construction.
    pub async fn new(config: BlockchainConfig, wallet: &Wallet) -> BlockchainResult<Self> {
        let rpc_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(rpc_url)
            .erased();

        let client = Self::from_provider(provider, config.clone());

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(chain_id = config.chain_id, "Blockchain client initialized");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Wrap an already connected provider. No chain id check.
    pub fn from_provider(provider: DynProvider, config: BlockchainConfig) -> Self {
        Self {
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            provider,
            config,
        }
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        let id = self
            .bounded(self.provider.get_chain_id(), |e| {
                BlockchainError::Rpc(format!("eth_chainId failed: {}", e))
            })
            .await?;
        Ok(ChainId(id))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.bounded(self.provider.get_block_number(), |e| {
            BlockchainError::Rpc(format!("eth_blockNumber failed: {}", e))
        })
        .await
    }

    /// Run an RPC future under the configured timeout.
    pub async fn bounded<T, E, F>(
        &self,
        fut: F,
        map_err: impl FnOnce(E) -> BlockchainError,
    ) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_err(e)),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The RPC URL may embed an API key.
        f.debug_struct("ChainClient")
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
