//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the notary.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::content::HashAlgorithm;

/// Root configuration for the notary service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NotaryConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Blockchain integration settings.
    pub blockchain: BlockchainConfig,

    /// File upload handling.
    pub upload: UploadConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub frontend: FrontendConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    ///
    /// Uploads wait for on-chain confirmation, so this must outlast
    /// `blockchain.confirmation_timeout_secs`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Use the on-chain registry. When false an in-memory ledger is used
    /// and nothing is written to any chain.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (80002 for Polygon Amoy, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations to wait for on every write.
    pub confirmation_blocks: u64,

    /// Maximum time to wait for a receipt in seconds.
    pub confirmation_timeout_secs: u64,

    /// Address of the content registry contract.
    pub contract_address: String,

    /// Block explorer prefix; the transaction hash is appended to it.
    pub explorer_tx_url: String,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // Empty so `ALCHEMY_API_KEY` can fill it in.
            rpc_url: String::new(),
            chain_id: 80002,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 90,
            contract_address: String::new(),
            explorer_tx_url: "https://amoy.polygonscan.com/tx/".to_string(),
        }
    }
}

/// Upload handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Multipart field carrying the file.
    pub field_name: String,

    /// Maximum accepted request body in bytes.
    pub max_file_size: usize,

    /// Digest applied to the uploaded bytes.
    pub hash_algorithm: HashAlgorithm,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: "file".to_string(),
            max_file_size: 10 * 1024 * 1024, // 10MB
            hash_algorithm: HashAlgorithm::Keccak256,
        }
    }
}

/// Placeholder admin key shipped in defaults; refused by validation.
pub const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the `/admin` routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

/// Static frontend hosting.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FrontendConfig {
    /// Directory served for paths no API route matches.
    pub static_dir: Option<PathBuf>,
}
