use alloy::primitives::Address;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::response::{ApiError, ApiResult, TxResponse};
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub backend: &'static str,
    pub signer: String,
    pub contract: Option<String>,
    pub chain_id: u64,
    /// `None` when the chain did not answer.
    pub block_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AuditorRequest {
    pub address: String,
    #[serde(default = "default_allowed")]
    pub allowed: bool,
}

fn default_allowed() -> bool {
    true
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let info = state.ledger.info();
    let block_number = match state.ledger.chain_head().await {
        Ok(head) => Some(head),
        Err(e) => {
            tracing::warn!(error = %e, "Admin status: chain head unavailable");
            None
        }
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        backend: info.backend,
        signer: info.signer.to_checksum(None),
        contract: info.contract,
        chain_id: info.chain_id,
        block_number,
    })
}

pub async fn set_auditor(
    State(state): State<AppState>,
    payload: Result<Json<AuditorRequest>, JsonRejection>,
) -> ApiResult<TxResponse> {
    let Json(request) = payload?;
    let auditor: Address = request.address.parse().map_err(|e| {
        ApiError::BadRequest(format!("Invalid auditor address '{}': {}", request.address, e))
    })?;

    let outcome = state.ledger.set_auditor(auditor, request.allowed).await?;
    tracing::info!(auditor = %auditor, allowed = request.allowed, tx_hash = %outcome.tx_hash, "Auditor updated");

    Ok(Json(TxResponse::confirmed(
        "Auditor updated",
        &outcome,
        &state.config.blockchain.explorer_tx_url,
    )))
}
