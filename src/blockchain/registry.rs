//! Content registry contract bindings and the `ContentLedger` seam.

use alloy::primitives::Address;
use alloy::sol;
use async_trait::async_trait;

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::TxSubmitter;
use crate::blockchain::types::{
    AttestationRecord, BlockchainError, BlockchainResult, LedgerInfo, ReportStatus, TxOutcome,
};
use crate::blockchain::wallet::Wallet;
use crate::content::ContentDigest;

sol! {
    /// Attestation registry deployed on-chain. Only the signatures are
    /// known here; rules are enforced by the contract.
    interface IContentRegistry {
        struct Attestation {
            bool passed;
            uint64 timestamp;
            address auditor;
            string action;
            string reason;
        }

        function registerContent(bytes32 hash) external;
        function verifyContent(bytes32 hash) external view returns (bool);
        function setAuditor(address auditor, bool allowed) external;
        function attestReport(bytes32 hash, bool passed, string reason) external;
        function revokeAttestation(bytes32 hash, string reason) external;
        function getReportStatus(bytes32 hash) external view returns (
            bool registered,
            bool hasAttestation,
            bool passed,
            address auditor,
            uint64 timestamp,
            string reason
        );
        function getAttestationHistory(bytes32 hash) external view returns (Attestation[] memory);
    }
}

/// Everything the HTTP layer needs from the registry.
#[async_trait]
pub trait ContentLedger: Send + Sync {
    /// `registerContent`; reverts with "Already registered" on duplicates.
    async fn register(&self, digest: ContentDigest) -> BlockchainResult<TxOutcome>;

    /// `verifyContent`.
    async fn is_registered(&self, digest: ContentDigest) -> BlockchainResult<bool>;

    /// `attestReport`.
    async fn attest(
        &self,
        digest: ContentDigest,
        passed: bool,
        reason: String,
    ) -> BlockchainResult<TxOutcome>;

    /// `revokeAttestation`.
    async fn revoke(&self, digest: ContentDigest, reason: String) -> BlockchainResult<TxOutcome>;

    /// `getReportStatus`.
    async fn report_status(&self, digest: ContentDigest) -> BlockchainResult<ReportStatus>;

    /// `getAttestationHistory`, oldest first.
    async fn attestation_history(
        &self,
        digest: ContentDigest,
    ) -> BlockchainResult<Vec<AttestationRecord>>;

    /// `setAuditor`.
    async fn set_auditor(&self, auditor: Address, allowed: bool) -> BlockchainResult<TxOutcome>;

    /// Latest block number; doubles as the health probe.
    async fn chain_head(&self) -> BlockchainResult<u64>;

    fn info(&self) -> LedgerInfo;
}

/// `ContentLedger` backed by the deployed registry contract.
pub struct OnChainLedger {
    submitter: TxSubmitter,
    signer: Address,
}

impl OnChainLedger {
    /// Connect to the registry at `contract`, signing with `wallet`.
    pub async fn connect(
        config: crate::config::BlockchainConfig,
        wallet: &Wallet,
    ) -> BlockchainResult<Self> {
        let contract: Address = config.contract_address.parse().map_err(|e| {
            BlockchainError::NotAvailable(format!(
                "Invalid contract address '{}': {}",
                config.contract_address, e
            ))
        })?;

        let client = ChainClient::new(config, wallet).await?;
        tracing::info!(contract = %contract, signer = %wallet.address(), "Registry ledger ready");

        Ok(Self::from_client(client, contract, wallet.address()))
    }

    /// Ledger over an existing client; `signer` must be the account the
    /// client's provider signs for.
    pub fn from_client(client: ChainClient, contract: Address, signer: Address) -> Self {
        Self {
            submitter: TxSubmitter::new(client, contract, signer),
            signer,
        }
    }
}

#[async_trait]
impl ContentLedger for OnChainLedger {
    async fn register(&self, digest: ContentDigest) -> BlockchainResult<TxOutcome> {
        self.submitter
            .send(IContentRegistry::registerContentCall {
                hash: digest.as_b256(),
            })
            .await
    }

    async fn is_registered(&self, digest: ContentDigest) -> BlockchainResult<bool> {
        self.submitter
            .call(IContentRegistry::verifyContentCall {
                hash: digest.as_b256(),
            })
            .await
    }

    async fn attest(
        &self,
        digest: ContentDigest,
        passed: bool,
        reason: String,
    ) -> BlockchainResult<TxOutcome> {
        self.submitter
            .send(IContentRegistry::attestReportCall {
                hash: digest.as_b256(),
                passed,
                reason,
            })
            .await
    }

    async fn revoke(&self, digest: ContentDigest, reason: String) -> BlockchainResult<TxOutcome> {
        self.submitter
            .send(IContentRegistry::revokeAttestationCall {
                hash: digest.as_b256(),
                reason,
            })
            .await
    }

    async fn report_status(&self, digest: ContentDigest) -> BlockchainResult<ReportStatus> {
        let status = self
            .submitter
            .call(IContentRegistry::getReportStatusCall {
                hash: digest.as_b256(),
            })
            .await?;

        Ok(ReportStatus {
            registered: status.registered,
            has_attestation: status.hasAttestation,
            passed: status.passed,
            auditor: status.auditor,
            timestamp: status.timestamp,
            reason: status.reason,
        })
    }

    async fn attestation_history(
        &self,
        digest: ContentDigest,
    ) -> BlockchainResult<Vec<AttestationRecord>> {
        let entries = self
            .submitter
            .call(IContentRegistry::getAttestationHistoryCall {
                hash: digest.as_b256(),
            })
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| AttestationRecord {
                passed: entry.passed,
                timestamp: entry.timestamp,
                auditor: entry.auditor,
                action: entry.action,
                reason: entry.reason,
            })
            .collect())
    }

    async fn set_auditor(&self, auditor: Address, allowed: bool) -> BlockchainResult<TxOutcome> {
        self.submitter
            .send(IContentRegistry::setAuditorCall { auditor, allowed })
            .await
    }

    async fn chain_head(&self) -> BlockchainResult<u64> {
        let client = self.submitter.client();
        let result = client.get_block_number().await;
        crate::observability::metrics::record_chain_health(result.is_ok());
        result
    }

    fn info(&self) -> LedgerInfo {
        LedgerInfo {
            backend: "on-chain",
            chain_id: self.submitter.client().config().chain_id,
            signer: self.signer,
            contract: Some(self.submitter.contract().to_checksum(None)),
        }
    }
}
