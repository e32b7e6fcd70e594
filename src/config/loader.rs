//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::NotaryConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the port part of `listener.bind_address`.
pub const PORT_ENV_VAR: &str = "PORT";
/// Overrides `blockchain.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "NOTARY_RPC_URL";
/// Used to derive the Polygon Amoy Alchemy URL when no RPC URL is set.
pub const ALCHEMY_KEY_ENV_VAR: &str = "ALCHEMY_API_KEY";
/// Overrides `blockchain.contract_address`, checked in order.
pub const CONTRACT_ENV_VARS: [&str; 2] = ["NOTARY_CONTRACT_ADDRESS", "CONTRACT_ADDRESS"];

const ALCHEMY_AMOY_URL: &str = "https://polygon-amoy.g.alchemy.com/v2/";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<NotaryConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load, apply environment overrides and validate.
///
/// With no path the built-in defaults are the starting point.
pub fn load_config(path: Option<&Path>) -> Result<NotaryConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => NotaryConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply the environment overrides through `lookup` (injectable for tests).
pub fn apply_env_overrides<F>(config: &mut NotaryConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(PORT_ENV_VAR).filter(|p| !p.is_empty()) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(url) = lookup(RPC_URL_ENV_VAR).filter(|u| !u.is_empty()) {
        config.blockchain.rpc_url = url;
    } else if config.blockchain.rpc_url.is_empty() {
        if let Some(key) = lookup(ALCHEMY_KEY_ENV_VAR).filter(|k| !k.is_empty()) {
            config.blockchain.rpc_url = format!("{}{}", ALCHEMY_AMOY_URL, key);
        }
    }

    if let Some(address) = CONTRACT_ENV_VARS
        .iter()
        .find_map(|&key| lookup(key).filter(|a| !a.is_empty()))
    {
        config.blockchain.contract_address = address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:4000"

            [upload]
            max_file_size = 1024
            "#
        )
        .unwrap();

        let config = read_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.upload.max_file_size, 1024);
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 3").unwrap();
        let err = read_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_port_override_keeps_host() {
        let mut config = NotaryConfig::default();
        config.listener.bind_address = "127.0.0.1:3000".to_string();
        apply_env_overrides(&mut config, env(&[("PORT", "8088")]));
        assert_eq!(config.listener.bind_address, "127.0.0.1:8088");
    }

    #[test]
    fn test_env_only_deployment_goes_on_chain() {
        let mut config = NotaryConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("ALCHEMY_API_KEY", "abc"),
                ("CONTRACT_ADDRESS", "0x0000000000000000000000000000000000000001"),
            ]),
        );

        assert!(config.blockchain.enabled);
        assert_eq!(
            config.blockchain.rpc_url,
            "https://polygon-amoy.g.alchemy.com/v2/abc"
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_alchemy_url_only_when_rpc_unset() {
        let mut config = NotaryConfig::default();
        config.blockchain.rpc_url = String::new();
        apply_env_overrides(&mut config, env(&[("ALCHEMY_API_KEY", "abc")]));
        assert_eq!(
            config.blockchain.rpc_url,
            "https://polygon-amoy.g.alchemy.com/v2/abc"
        );

        let mut config = NotaryConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("ALCHEMY_API_KEY", "abc"), ("NOTARY_RPC_URL", "http://node:8545")]),
        );
        assert_eq!(config.blockchain.rpc_url, "http://node:8545");
    }

    #[test]
    fn test_contract_override_precedence() {
        let mut config = NotaryConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("CONTRACT_ADDRESS", "0x0000000000000000000000000000000000000002"),
                ("NOTARY_CONTRACT_ADDRESS", "0x0000000000000000000000000000000000000001"),
            ]),
        );
        assert_eq!(
            config.blockchain.contract_address,
            "0x0000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "a",
                message: "bad".into(),
            },
            ValidationError {
                field: "b",
                message: "worse".into(),
            },
        ]);
        assert_eq!(err.to_string(), "Validation failed: a: bad, b: worse");
    }
}
