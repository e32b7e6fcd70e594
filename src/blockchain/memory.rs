//! In-process ledger for local runs and tests.
//!
//! Mirrors the registry's observable behavior: duplicate registrations
//! revert, attestation requires a registered digest and an allowed auditor,
//! revocation requires a live attestation, history is append-only. Nothing
//! is persisted.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{keccak256, Address, TxHash};
use async_trait::async_trait;

use crate::blockchain::registry::ContentLedger;
use crate::blockchain::types::{
    AttestationRecord, BlockchainError, BlockchainResult, LedgerInfo, ReportStatus, TxOutcome,
    ALREADY_REGISTERED_REASON,
};
use crate::content::ContentDigest;

pub const NOT_REGISTERED_REASON: &str = "Not registered";
pub const NOT_AUDITOR_REASON: &str = "Not an authorized auditor";
pub const NO_ATTESTATION_REASON: &str = "No active attestation";

#[derive(Debug, Default)]
struct Entry {
    has_attestation: bool,
    passed: bool,
    auditor: Address,
    timestamp: u64,
    reason: String,
    history: Vec<AttestationRecord>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<ContentDigest, Entry>,
    auditors: HashSet<Address>,
    block_number: u64,
    tx_count: u64,
}

impl State {
    /// Mine a pseudo transaction.
    fn mine(&mut self, signer: Address) -> TxOutcome {
        self.tx_count += 1;
        self.block_number += 1;

        let mut preimage = Vec::with_capacity(20 + 16);
        preimage.extend_from_slice(signer.as_slice());
        preimage.extend_from_slice(&self.tx_count.to_be_bytes());
        preimage.extend_from_slice(&self.block_number.to_be_bytes());

        TxOutcome {
            tx_hash: TxHash::from(keccak256(&preimage)),
            block_number: Some(self.block_number),
        }
    }
}

/// `ContentLedger` held entirely in memory.
#[derive(Debug)]
pub struct MemoryLedger {
    signer: Address,
    chain_id: u64,
    state: Mutex<State>,
}

impl MemoryLedger {
    /// The signer starts out as an allowed auditor.
    pub fn new(signer: Address, chain_id: u64) -> Self {
        let mut state = State::default();
        state.auditors.insert(signer);
        Self {
            signer,
            chain_id,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn revert(reason: &str) -> BlockchainError {
        BlockchainError::Reverted(reason.to_string())
    }
}

#[async_trait]
impl ContentLedger for MemoryLedger {
    async fn register(&self, digest: ContentDigest) -> BlockchainResult<TxOutcome> {
        let mut state = self.state();
        if state.entries.contains_key(&digest) {
            return Err(Self::revert(ALREADY_REGISTERED_REASON));
        }
        state.entries.insert(digest, Entry::default());
        let outcome = state.mine(self.signer);
        tracing::debug!(digest = %digest, tx_hash = %outcome.tx_hash, "Registered in memory");
        Ok(outcome)
    }

    async fn is_registered(&self, digest: ContentDigest) -> BlockchainResult<bool> {
        Ok(self.state().entries.contains_key(&digest))
    }

    async fn attest(
        &self,
        digest: ContentDigest,
        passed: bool,
        reason: String,
    ) -> BlockchainResult<TxOutcome> {
        let mut state = self.state();
        if !state.auditors.contains(&self.signer) {
            return Err(Self::revert(NOT_AUDITOR_REASON));
        }
        let timestamp = Self::now();
        let entry = state
            .entries
            .get_mut(&digest)
            .ok_or_else(|| Self::revert(NOT_REGISTERED_REASON))?;

        entry.has_attestation = true;
        entry.passed = passed;
        entry.auditor = self.signer;
        entry.timestamp = timestamp;
        entry.reason = reason.clone();
        entry.history.push(AttestationRecord {
            passed,
            timestamp,
            auditor: self.signer,
            action: "attest".to_string(),
            reason,
        });

        Ok(state.mine(self.signer))
    }

    async fn revoke(&self, digest: ContentDigest, reason: String) -> BlockchainResult<TxOutcome> {
        let mut state = self.state();
        if !state.auditors.contains(&self.signer) {
            return Err(Self::revert(NOT_AUDITOR_REASON));
        }
        let timestamp = Self::now();
        let entry = state
            .entries
            .get_mut(&digest)
            .ok_or_else(|| Self::revert(NOT_REGISTERED_REASON))?;
        if !entry.has_attestation {
            return Err(Self::revert(NO_ATTESTATION_REASON));
        }

        entry.has_attestation = false;
        entry.passed = false;
        entry.auditor = self.signer;
        entry.timestamp = timestamp;
        entry.reason = reason.clone();
        entry.history.push(AttestationRecord {
            passed: false,
            timestamp,
            auditor: self.signer,
            action: "revoke".to_string(),
            reason,
        });

        Ok(state.mine(self.signer))
    }

    async fn report_status(&self, digest: ContentDigest) -> BlockchainResult<ReportStatus> {
        let state = self.state();
        Ok(match state.entries.get(&digest) {
            Some(entry) => ReportStatus {
                registered: true,
                has_attestation: entry.has_attestation,
                passed: entry.passed,
                auditor: entry.auditor,
                timestamp: entry.timestamp,
                reason: entry.reason.clone(),
            },
            None => ReportStatus {
                registered: false,
                has_attestation: false,
                passed: false,
                auditor: Address::ZERO,
                timestamp: 0,
                reason: String::new(),
            },
        })
    }

    async fn attestation_history(
        &self,
        digest: ContentDigest,
    ) -> BlockchainResult<Vec<AttestationRecord>> {
        Ok(self
            .state()
            .entries
            .get(&digest)
            .map(|entry| entry.history.clone())
            .unwrap_or_default())
    }

    async fn set_auditor(&self, auditor: Address, allowed: bool) -> BlockchainResult<TxOutcome> {
        let mut state = self.state();
        if allowed {
            state.auditors.insert(auditor);
        } else {
            state.auditors.remove(&auditor);
        }
        Ok(state.mine(self.signer))
    }

    async fn chain_head(&self) -> BlockchainResult<u64> {
        Ok(self.state().block_number)
    }

    fn info(&self) -> LedgerInfo {
        LedgerInfo {
            backend: "memory",
            chain_id: self.chain_id,
            signer: self.signer,
            contract: None,
        }
    }
}
