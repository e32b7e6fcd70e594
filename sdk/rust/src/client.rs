use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The notary answered with a non-success status.
    #[error("Notary returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file_hash: String,
    pub transaction_id: String,
    pub transaction_link: String,
    /// `data:image/png;base64,...`
    pub qr_code: String,
}

#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Registered(UploadReceipt),
    /// The digest was on the ledger before this upload.
    AlreadyRegistered { file_hash: String },
}

impl UploadOutcome {
    pub fn file_hash(&self) -> &str {
        match self {
            UploadOutcome::Registered(receipt) => &receipt.file_hash,
            UploadOutcome::AlreadyRegistered { file_hash } => file_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub message: String,
    pub tx_hash: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatus {
    pub registered: bool,
    pub has_attestation: bool,
    pub passed: bool,
    pub auditor: String,
    pub timestamp: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationEntry {
    pub passed: bool,
    pub timestamp: u64,
    pub auditor: String,
    pub action: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub chain_reachable: bool,
}

#[derive(Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Deserialize)]
struct Exists {
    exists: bool,
}

#[derive(Deserialize)]
struct History {
    history: Vec<AttestationEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Duplicate {
    file_hash: String,
}

#[derive(Serialize)]
struct AttestBody<'a> {
    hash: &'a str,
    passed: bool,
    reason: &'a str,
}

#[derive(Serialize)]
struct RevokeBody<'a> {
    hash: &'a str,
    reason: &'a str,
}

#[derive(Serialize)]
struct AuditorBody<'a> {
    address: &'a str,
    allowed: bool,
}

pub struct NotaryClient {
    client: Client,
    base_url: String,
}

impl NotaryClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a document so its hash gets registered.
    ///
    /// A duplicate upload is not an error: the server answers 409 with the
    /// digest, which comes back as `UploadOutcome::AlreadyRegistered`.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadOutcome, SdkError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        if resp.status() == StatusCode::CONFLICT {
            let text = resp.text().await?;
            let body: Data<Duplicate> = serde_json::from_str(&text)?;
            return Ok(UploadOutcome::AlreadyRegistered {
                file_hash: body.data.file_hash,
            });
        }

        let body: Data<UploadReceipt> = decode(resp).await?;
        Ok(UploadOutcome::Registered(body.data))
    }

    pub async fn verify(&self, hash: &str) -> Result<bool, SdkError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/verify/{}", hash)))
            .send()
            .await?;
        let body: Data<Exists> = decode(resp).await?;
        Ok(body.data.exists)
    }

    pub async fn attest(&self, hash: &str, passed: bool, reason: &str) -> Result<TxReceipt, SdkError> {
        let resp = self
            .client
            .post(self.url("/api/attest"))
            .json(&AttestBody { hash, passed, reason })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn revoke(&self, hash: &str, reason: &str) -> Result<TxReceipt, SdkError> {
        let resp = self
            .client
            .post(self.url("/api/revoke"))
            .json(&RevokeBody { hash, reason })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn status(&self, hash: &str) -> Result<ReportStatus, SdkError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/status/{}", hash)))
            .send()
            .await?;
        let body: Data<ReportStatus> = decode(resp).await?;
        Ok(body.data)
    }

    pub async fn history(&self, hash: &str) -> Result<Vec<AttestationEntry>, SdkError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/history/{}", hash)))
            .send()
            .await?;
        let body: History = decode(resp).await?;
        Ok(body.history)
    }

    /// `/health` answers 503 with a body when the chain is down; both are reports.
    pub async fn health(&self) -> Result<HealthReport, SdkError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        if resp.status() == StatusCode::SERVICE_UNAVAILABLE {
            let text = resp.text().await?;
            return Ok(serde_json::from_str(&text)?);
        }
        decode(resp).await
    }

    /// Allow or deny an auditor through the admin API.
    pub async fn set_auditor(
        &self,
        admin_key: &str,
        address: &str,
        allowed: bool,
    ) -> Result<TxReceipt, SdkError> {
        let resp = self
            .client
            .post(self.url("/admin/auditors"))
            .bearer_auth(admin_key)
            .json(&AuditorBody { address, allowed })
            .send()
            .await?;
        decode(resp).await
    }

    /// Raw admin status document.
    pub async fn admin_status(&self, admin_key: &str) -> Result<serde_json::Value, SdkError> {
        let resp = self
            .client
            .get(self.url("/admin/status"))
            .bearer_auth(admin_key)
            .send()
            .await?;
        decode(resp).await
    }
}

/// Decode a success body, or turn the `{success:false, error}` body into `SdkError::Api`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(text);
        return Err(SdkError::Api { status, message });
    }

    Ok(serde_json::from_str(&text)?)
}
