//! HTTP client for the content notary API.

pub mod client;

pub use client::{
    AttestationEntry, HealthReport, NotaryClient, ReportStatus, SdkError, TxReceipt,
    UploadOutcome, UploadReceipt,
};
