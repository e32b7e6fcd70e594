//! Content hashing and receipt rendering.
//!
//! # Data Flow
//! ```text
//! uploaded bytes
//!     → digest.rs (keccak256 / sha256 → ContentDigest)
//!     → [ledger registers the digest, returns a tx hash]
//!     → transaction_link (explorer prefix + tx hash)
//!     → qr.rs (PNG QR code of the link, as a data URI)
//! ```

pub mod digest;
pub mod qr;

use alloy::hex;
use alloy::primitives::TxHash;
use thiserror::Error;

pub use digest::{ContentDigest, HashAlgorithm};
pub use qr::qr_data_uri;

/// Errors raised while hashing content or rendering receipts.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Not 32 bytes of hex.
    #[error("Invalid content hash '{0}': expected 0x followed by 64 hex characters")]
    InvalidDigest(String),

    #[error("Unknown hash algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("QR code encoding failed: {0}")]
    QrEncoding(String),
}

/// Hex form of a transaction hash, as returned to clients.
pub fn tx_hash_hex(tx_hash: &TxHash) -> String {
    hex::encode_prefixed(tx_hash)
}

/// Append a transaction hash to the explorer prefix, verbatim.
pub fn transaction_link(explorer_tx_url: &str, tx_hash: &TxHash) -> String {
    format!("{}{}", explorer_tx_url, tx_hash_hex(tx_hash))
}
