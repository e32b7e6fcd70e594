//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Catch settings that only break at request time (confirmation outlasting
//!   the request timeout, placeholder admin keys)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NotaryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use alloy::primitives::Address;
use axum::http::HeaderValue;

use crate::config::schema::{NotaryConfig, ADMIN_KEY_PLACEHOLDER};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &NotaryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    let chain = &config.blockchain;
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            "must be > 0",
        ));
    } else if chain.confirmation_timeout_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            format!(
                "must be shorter than timeouts.request_secs ({})",
                config.timeouts.request_secs
            ),
        ));
    }
    if chain.explorer_tx_url.trim().is_empty() {
        errors.push(ValidationError::new("blockchain.explorer_tx_url", "must not be empty"));
    }
    if chain.enabled {
        if chain.rpc_url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.rpc_url",
                format!("'{}' is not a URL", chain.rpc_url),
            ));
        }
        if chain.contract_address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.contract_address",
                format!("'{}' is not an address", chain.contract_address),
            ));
        }
    }

    if config.upload.max_file_size == 0 {
        errors.push(ValidationError::new("upload.max_file_size", "must be > 0"));
    }
    if config.upload.field_name.is_empty() {
        errors.push(ValidationError::new("upload.field_name", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled
        && (config.admin.api_key.is_empty() || config.admin.api_key == ADMIN_KEY_PLACEHOLDER)
    {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set to a real key when admin is enabled",
        ));
    }

    for origin in &config.security.cors_allowed_origins {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "security.cors_allowed_origins",
                format!("'{}' is not a valid origin", origin),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
