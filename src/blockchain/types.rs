//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use serde::{Serialize, Serializer};
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

/// Revert reason the registry uses for duplicate registrations.
pub const ALREADY_REGISTERED_REASON: &str = "Already registered";

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// No receipt within the confirmation window.
    #[error("Transaction not confirmed within {0} seconds")]
    ConfirmationTimeout(u64),

    /// Call or transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or missing key.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Blockchain client not initialized or disabled.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

impl BlockchainError {
    /// Whether the registry refused a digest it already holds.
    pub fn is_already_registered(&self) -> bool {
        match self {
            BlockchainError::Reverted(reason) => reason
                .to_ascii_lowercase()
                .contains(&ALREADY_REGISTERED_REASON.to_ascii_lowercase()),
            _ => false,
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// A mined, successful state-changing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

fn checksummed<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

/// Current registration/attestation state of one digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatus {
    pub registered: bool,
    pub has_attestation: bool,
    pub passed: bool,
    #[serde(serialize_with = "checksummed")]
    pub auditor: Address,
    /// Unix seconds of the latest attestation action.
    pub timestamp: u64,
    pub reason: String,
}

/// One entry of a digest's append-only attestation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRecord {
    pub passed: bool,
    pub timestamp: u64,
    #[serde(serialize_with = "checksummed")]
    pub auditor: Address,
    pub action: String,
    pub reason: String,
}

/// Static description of a ledger backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerInfo {
    /// `"on-chain"` or `"memory"`.
    pub backend: &'static str,
    pub chain_id: u64,
    #[serde(serialize_with = "checksummed")]
    pub signer: Address,
    pub contract: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ChainMismatch {
            expected: 80002,
            actual: 1,
        };
        assert!(err.to_string().contains("80002"));
    }

    #[test]
    fn test_already_registered_detection() {
        assert!(BlockchainError::Reverted("Already registered".into()).is_already_registered());
        assert!(BlockchainError::Reverted("content already registered".into()).is_already_registered());
        assert!(!BlockchainError::Reverted("Not an auditor".into()).is_already_registered());
        assert!(!BlockchainError::Rpc("Already registered".into()).is_already_registered());
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = ReportStatus {
            registered: true,
            has_attestation: false,
            passed: false,
            auditor: Address::ZERO,
            timestamp: 0,
            reason: String::new(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["hasAttestation"], false);
        assert_eq!(json["auditor"], "0x0000000000000000000000000000000000000000");
    }
}
