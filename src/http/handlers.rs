//! Public API handlers.
//!
//! Each handler is a straight line: parse input, one ledger call, shape the
//! result. Ledger errors propagate through `ApiError`.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::content::{self, ContentDigest};
use crate::http::response::{
    ApiError, ApiResult, DataResponse, Exists, HealthResponse, HistoryResponse,
    StatusResponse, TxResponse, UploadData, UploadResponse, VerifyResponse,
    UPLOAD_SUCCESS_MESSAGE,
};
use crate::http::server::AppState;
use crate::observability::metrics;

const DEFAULT_REVOKE_REASON: &str = "revoked";

#[derive(Debug, Deserialize)]
pub struct AttestRequest {
    pub hash: String,
    #[serde(default)]
    pub passed: Option<bool>,
    /// Missing or null means no reason.
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub hash: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /api/upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    let mut multipart = multipart?;
    let upload = &state.config.upload;

    let digest = {
        let bytes = read_file_field(&mut multipart, &upload.field_name, upload.max_file_size).await?;
        metrics::record_upload_bytes(bytes.len());
        upload.hash_algorithm.digest(&bytes)
    };
    tracing::info!(file_hash = %digest, algorithm = %upload.hash_algorithm, "Registering upload");

    let outcome = match state.ledger.register(digest).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_already_registered() => {
            tracing::info!(file_hash = %digest, "Upload already registered");
            return Err(ApiError::AlreadyRegistered(digest));
        }
        Err(e) => return Err(e.into()),
    };

    let transaction_link =
        content::transaction_link(&state.config.blockchain.explorer_tx_url, &outcome.tx_hash);
    let qr_code = content::qr_data_uri(&transaction_link)?;

    Ok(Json(UploadResponse {
        success: true,
        message: UPLOAD_SUCCESS_MESSAGE,
        data: UploadData {
            file_hash: digest,
            transaction_id: content::tx_hash_hex(&outcome.tx_hash),
            transaction_link,
            qr_code,
        },
    }))
}

/// Buffer the named field, skipping any others.
async fn read_file_field(
    multipart: &mut Multipart,
    field_name: &str,
    max_file_size: usize,
) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let bytes = field.bytes().await?;
        if bytes.len() > max_file_size {
            return Err(ApiError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                max_file_size
            )));
        }
        return Ok(bytes.to_vec());
    }
    Err(ApiError::BadRequest(format!(
        "No file uploaded in field '{}'",
        field_name
    )))
}

/// `GET /api/verify/{hash}`
pub async fn verify(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ApiResult<VerifyResponse> {
    let digest: ContentDigest = hash.parse()?;
    let exists = state.ledger.is_registered(digest).await?;
    Ok(Json(DataResponse::ok(Exists { exists })))
}

/// `POST /api/attest`
pub async fn attest(
    State(state): State<AppState>,
    payload: Result<Json<AttestRequest>, JsonRejection>,
) -> ApiResult<TxResponse> {
    let Json(request) = payload?;
    let digest: ContentDigest = request.hash.parse()?;
    let passed = request.passed.unwrap_or(false);
    let reason = request.reason.unwrap_or_default();

    let outcome = state.ledger.attest(digest, passed, reason).await?;
    tracing::info!(file_hash = %digest, passed, tx_hash = %outcome.tx_hash, "Report attested");

    Ok(Json(TxResponse::confirmed(
        "Report attested",
        &outcome,
        &state.config.blockchain.explorer_tx_url,
    )))
}

/// `POST /api/revoke`
pub async fn revoke(
    State(state): State<AppState>,
    payload: Result<Json<RevokeRequest>, JsonRejection>,
) -> ApiResult<TxResponse> {
    let Json(request) = payload?;
    let digest: ContentDigest = request.hash.parse()?;
    let reason = request
        .reason
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REVOKE_REASON.to_string());

    let outcome = state.ledger.revoke(digest, reason).await?;
    tracing::info!(file_hash = %digest, tx_hash = %outcome.tx_hash, "Attestation revoked");

    Ok(Json(TxResponse::confirmed(
        "Attestation revoked",
        &outcome,
        &state.config.blockchain.explorer_tx_url,
    )))
}

/// `GET /api/status/{hash}`
pub async fn status(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ApiResult<StatusResponse> {
    let digest: ContentDigest = hash.parse()?;
    let status = state.ledger.report_status(digest).await?;
    Ok(Json(DataResponse::ok(status)))
}

/// `GET /api/history/{hash}`
pub async fn history(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ApiResult<HistoryResponse> {
    let digest: ContentDigest = hash.parse()?;
    let history = state.ledger.attestation_history(digest).await?;
    Ok(Json(HistoryResponse {
        success: true,
        history,
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.ledger.chain_head().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                chain_reachable: true,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: chain unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    chain_reachable: false,
                }),
            )
        }
    }
}
