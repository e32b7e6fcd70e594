//! Content digests registered on-chain.

use std::fmt;
use std::str::FromStr;

use alloy::hex;
use alloy::primitives::{keccak256, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::content::ContentError;

/// Digest applied to uploaded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Ethereum keccak-256, what `ethers.keccak256` produces.
    #[default]
    Keccak256,
    /// FIPS SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Hash `bytes` into a 32-byte content digest.
    pub fn digest(self, bytes: &[u8]) -> ContentDigest {
        match self {
            HashAlgorithm::Keccak256 => ContentDigest(keccak256(bytes)),
            HashAlgorithm::Sha256 => ContentDigest(B256::from_slice(&Sha256::digest(bytes))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Keccak256 => "keccak256",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" => Ok(HashAlgorithm::Keccak256),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(ContentError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// A 32-byte content hash, rendered as `0x` followed by 64 lowercase hex chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(B256);

impl ContentDigest {
    pub fn as_b256(&self) -> B256 {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(self.0)
    }
}

impl From<B256> for ContentDigest {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<ContentDigest> for B256 {
    fn from(value: ContentDigest) -> Self {
        value.0
    }
}

impl FromStr for ContentDigest {
    type Err = ContentError;

    /// Accepts 64 hex chars with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ContentError::InvalidDigest(s.to_string()));
        }

        let bytes: [u8; 32] = hex::decode_to_array(digits)
            .map_err(|_| ContentError::InvalidDigest(s.to_string()))?;
        Ok(Self(B256::from(bytes)))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
