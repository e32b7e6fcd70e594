//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::net::TcpListener;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::mock::Asserter;
use content_notary::blockchain::{
    AttestationRecord, BlockchainError, BlockchainResult, ChainClient, ContentLedger, LedgerInfo,
    MemoryLedger, OnChainLedger, ReportStatus, TxOutcome,
};
use content_notary::content::ContentDigest;
use content_notary::{HttpServer, NotaryConfig, Shutdown};

#[allow(dead_code)]
pub const ADMIN_KEY: &str = "integration-admin-key";

/// Signer of the in-memory ledger, an allowed auditor from the start.
#[allow(dead_code)]
pub fn signer() -> Address {
    Address::repeat_byte(0x42)
}

/// A running notary on a loopback port. Dropping it does not stop the
/// server; call `stop`.
pub struct TestNotary {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestNotary {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> notary_sdk::NotaryClient {
        notary_sdk::NotaryClient::with_client(http_client(), &self.url())
    }

    pub fn stop(self) {
        self.shutdown.trigger();
    }
}

/// Loopback config with the admin API on.
#[allow(dead_code)]
pub fn test_config() -> NotaryConfig {
    let mut config = NotaryConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.blockchain.enabled = false;
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

/// Start the server with an in-memory ledger.
#[allow(dead_code)]
pub async fn start_notary(config: NotaryConfig) -> TestNotary {
    let ledger = Arc::new(MemoryLedger::new(signer(), 31337));
    start_with_ledger(config, ledger).await
}

/// Registry ledger answering RPC calls from `asserter`, in order.
#[allow(dead_code)]
pub fn mocked_chain_ledger(asserter: &Asserter) -> OnChainLedger {
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter.clone())
        .erased();
    let config = test_config().blockchain;
    OnChainLedger::from_client(
        ChainClient::from_provider(provider, config),
        Address::repeat_byte(0x99),
        signer(),
    )
}

pub async fn start_with_ledger(config: NotaryConfig, ledger: Arc<dyn ContentLedger>) -> TestNotary {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, ledger);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // The listener is already bound; give the accept loop a moment.
    tokio::time::sleep(Duration::from_millis(50)).await;
    TestNotary { addr, shutdown }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Ledger whose every call fails the way an unreachable node does.
#[allow(dead_code)]
pub struct DownLedger;

#[allow(dead_code)]
pub const DOWN_MESSAGE: &str = "error sending request for url (http://127.0.0.1:1/)";

fn down<T>() -> BlockchainResult<T> {
    Err(BlockchainError::Rpc(DOWN_MESSAGE.to_string()))
}

#[async_trait]
impl ContentLedger for DownLedger {
    async fn register(&self, _digest: ContentDigest) -> BlockchainResult<TxOutcome> {
        down()
    }

    async fn is_registered(&self, _digest: ContentDigest) -> BlockchainResult<bool> {
        down()
    }

    async fn attest(
        &self,
        _digest: ContentDigest,
        _passed: bool,
        _reason: String,
    ) -> BlockchainResult<TxOutcome> {
        down()
    }

    async fn revoke(&self, _digest: ContentDigest, _reason: String) -> BlockchainResult<TxOutcome> {
        down()
    }

    async fn report_status(&self, _digest: ContentDigest) -> BlockchainResult<ReportStatus> {
        down()
    }

    async fn attestation_history(
        &self,
        _digest: ContentDigest,
    ) -> BlockchainResult<Vec<AttestationRecord>> {
        down()
    }

    async fn set_auditor(&self, _auditor: Address, _allowed: bool) -> BlockchainResult<TxOutcome> {
        down()
    }

    async fn chain_head(&self) -> BlockchainResult<u64> {
        down()
    }

    fn info(&self) -> LedgerInfo {
        LedgerInfo {
            backend: "memory",
            chain_id: 31337,
            signer: Address::ZERO,
            contract: None,
        }
    }
}
