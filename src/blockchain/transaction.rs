//! Contract call encoding, submission and confirmation.
//!
//! # Responsibilities
//! - ABI-encode calls against the registry address
//! - Run read calls (`eth_call`) under the RPC timeout
//! - Sign and broadcast writes, one submission at a time
//! - Wait for the receipt with the configured confirmation depth
//! - Decode revert reasons into `BlockchainError::Reverted`

use std::time::{Duration, Instant};

use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use alloy::providers::{PendingTransactionError, Provider, WatchTxError};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{decode_revert_reason, SolCall};
use alloy::transports::{RpcError, TransportErrorKind};
use tokio::sync::Mutex;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxOutcome};
use crate::observability::metrics;

/// Submits calls for one signer against one contract.
pub struct TxSubmitter {
    client: ChainClient,
    contract: Address,
    from: Address,
    /// Held from gas estimation until the node accepts the transaction, so
    /// two requests never fill the same nonce.
    submit_lock: Mutex<()>,
}

impl TxSubmitter {
    pub fn new(client: ChainClient, contract: Address, from: Address) -> Self {
        Self {
            client,
            contract,
            from,
            submit_lock: Mutex::new(()),
        }
    }

    fn request<C: SolCall>(&self, call: &C) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.contract)
            .with_input(call.abi_encode())
    }

    /// Execute a view call and decode its return value.
    pub async fn call<C: SolCall>(&self, call: C) -> BlockchainResult<C::Return> {
        let started = Instant::now();
        let tx = self.request(&call);
        let provider = self.client.provider();

        let result = self
            .client
            .bounded(async move { provider.call(tx).await }, |e| {
                classify_rpc_error(C::SIGNATURE, e)
            })
            .await
            .and_then(|output| {
                C::abi_decode_returns(&output).map_err(|e| {
                    BlockchainError::Rpc(format!("{}: cannot decode return data: {}", C::SIGNATURE, e))
                })
            });

        metrics::record_contract_call(C::SIGNATURE, result.is_ok(), started);
        result
    }

    /// Submit a state-changing call and wait for its receipt.
    pub async fn send<C: SolCall>(&self, call: C) -> BlockchainResult<TxOutcome> {
        let started = Instant::now();
        let result = self.send_inner(&call).await;
        metrics::record_contract_call(C::SIGNATURE, result.is_ok(), started);
        result
    }

    async fn send_inner<C: SolCall>(&self, call: &C) -> BlockchainResult<TxOutcome> {
        let config = self.client.config();
        let tx = self.request(call);
        let provider = self.client.provider();

        let pending = {
            let _guard = self.submit_lock.lock().await;
            self.client
                .bounded(async move { provider.send_transaction(tx).await }, |e| {
                    classify_rpc_error(C::SIGNATURE, e)
                })
                .await?
        };

        let tx_hash = *pending.tx_hash();
        tracing::debug!(method = C::SIGNATURE, tx_hash = %tx_hash, "Transaction broadcast");

        let receipt = pending
            .with_required_confirmations(config.confirmation_blocks.max(1))
            .with_timeout(Some(Duration::from_secs(config.confirmation_timeout_secs)))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    BlockchainError::ConfirmationTimeout(config.confirmation_timeout_secs)
                }
                other => BlockchainError::Rpc(format!("{}: {}", C::SIGNATURE, other)),
            })?;

        if !receipt.status() {
            return Err(BlockchainError::Reverted(format!(
                "{} reverted in transaction {}",
                C::SIGNATURE,
                tx_hash
            )));
        }

        tracing::info!(
            method = C::SIGNATURE,
            tx_hash = %tx_hash,
            block_number = ?receipt.block_number,
            "Transaction confirmed"
        );

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number,
        })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }
}

/// Turn an RPC failure into a typed error, surfacing revert reasons.
pub fn classify_rpc_error(method: &str, err: RpcError<TransportErrorKind>) -> BlockchainError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(reason) = payload
            .as_revert_data()
            .and_then(|data| decode_revert_reason(&data))
        {
            return BlockchainError::Reverted(strip_revert_prefix(&reason));
        }
        if let Some(reason) = reason_from_message(&payload.message) {
            return BlockchainError::Reverted(reason);
        }
    }
    BlockchainError::Rpc(format!("{}: {}", method, err))
}

fn strip_revert_prefix(reason: &str) -> String {
    reason
        .strip_prefix("revert: ")
        .unwrap_or(reason)
        .trim()
        .to_string()
}

/// Nodes report string reverts as `execution reverted: <reason>`.
fn reason_from_message(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("execution reverted")?;
    let reason = rest.trim_start_matches(':').trim();
    if reason.is_empty() {
        Some("execution reverted".to_string())
    } else {
        Some(strip_revert_prefix(reason))
    }
}
