//! Response bodies and error mapping.
//!
//! # Responsibilities
//! - Shape successful results into the JSON envelopes clients expect
//! - Map domain errors to HTTP status codes
//! - Keep the raw error message in `{success:false, error}` bodies
//!
//! # Status Mapping
//! - malformed hash, missing file field, bad multipart or JSON → 400
//! - upload over the size limit → 413
//! - duplicate registration → 409 with the digest
//! - missing or wrong admin token → 401
//! - everything else from the ledger or QR encoder → 500

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::blockchain::{AttestationRecord, BlockchainError, ReportStatus, TxOutcome};
use crate::content::{self, ContentDigest, ContentError};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File successfully registered on blockchain.";
pub const ALREADY_REGISTERED_MESSAGE: &str = "This file has already been registered on blockchain.";

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{}", ALREADY_REGISTERED_MESSAGE)]
    AlreadyRegistered(ContentDigest),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Ledger(#[from] BlockchainError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Ledger(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::InvalidDigest(_) | ContentError::UnknownAlgorithm(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ContentError::QrEncoding(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = match &self {
            ApiError::AlreadyRegistered(digest) => json!({
                "success": false,
                "message": ALREADY_REGISTERED_MESSAGE,
                "data": { "fileHash": digest },
            }),
            other => json!({ "success": false, "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    pub file_hash: ContentDigest,
    pub transaction_id: String,
    pub transaction_link: String,
    pub qr_code: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: UploadData,
}

#[derive(Debug, Serialize)]
pub struct Exists {
    pub exists: bool,
}

/// `{success, data}` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

pub type VerifyResponse = DataResponse<Exists>;
pub type StatusResponse = DataResponse<ReportStatus>;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<AttestationRecord>,
}

/// Receipt of a confirmed state-changing transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub success: bool,
    pub message: &'static str,
    pub tx_hash: String,
    pub link: String,
}

impl TxResponse {
    pub fn confirmed(message: &'static str, outcome: &TxOutcome, explorer_tx_url: &str) -> Self {
        Self {
            success: true,
            message,
            tx_hash: content::tx_hash_hex(&outcome.tx_hash),
            link: content::transaction_link(explorer_tx_url, &outcome.tx_hash),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub chain_reachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::HashAlgorithm;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_already_registered_body() {
        let digest = HashAlgorithm::Keccak256.digest(b"dup");
        let response = ApiError::AlreadyRegistered(digest).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], ALREADY_REGISTERED_MESSAGE);
        assert_eq!(body["data"]["fileHash"], digest.to_hex());
    }

    #[tokio::test]
    async fn test_ledger_error_keeps_raw_message() {
        let err = BlockchainError::Rpc("connection refused".into());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "RPC error: connection refused");
    }

    #[test]
    fn test_invalid_digest_is_bad_request() {
        let err: ApiError = "0x1234".parse::<ContentDigest>().unwrap_err().into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_qr_failure_is_internal() {
        let err: ApiError = ContentError::QrEncoding("too long".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_tx_response_link() {
        let outcome = TxOutcome {
            tx_hash: alloy::primitives::TxHash::repeat_byte(0x01),
            block_number: Some(7),
        };
        let response = TxResponse::confirmed("Report attested", &outcome, "https://scan/tx/");
        assert_eq!(response.tx_hash, format!("0x{}", "01".repeat(32)));
        assert_eq!(response.link, format!("https://scan/tx/{}", response.tx_hash));
    }
}
