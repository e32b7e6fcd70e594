//! End-to-end flows against a notary backed by the in-memory ledger.

use content_notary::content::{qr_data_uri, HashAlgorithm};
use notary_sdk::{SdkError, UploadOutcome};
use reqwest::StatusCode;

mod common;

const REPORT: &[u8] = b"Q3 sustainability report\nscope 1: 412.5 tCO2e\n";

#[tokio::test]
async fn test_same_file_twice_yields_same_hash() {
    let notary = common::start_notary(common::test_config()).await;
    let client = notary.client();

    let first = client.upload("report.txt", REPORT.to_vec()).await.unwrap();
    let receipt = match &first {
        UploadOutcome::Registered(receipt) => receipt.clone(),
        other => panic!("expected a fresh registration, got {:?}", other),
    };
    assert_eq!(
        receipt.file_hash,
        HashAlgorithm::Keccak256.digest(REPORT).to_hex()
    );

    let second = client.upload("copy.txt", REPORT.to_vec()).await.unwrap();
    assert!(matches!(second, UploadOutcome::AlreadyRegistered { .. }));
    assert_eq!(second.file_hash(), receipt.file_hash);

    notary.stop();
}

#[tokio::test]
async fn test_duplicate_upload_is_conflict() {
    let notary = common::start_notary(common::test_config()).await;
    let http = common::http_client();

    let mut statuses = Vec::new();
    for _ in 0..2 {
        let part = reqwest::multipart::Part::bytes(REPORT.to_vec()).file_name("report.txt");
        let form = reqwest::multipart::Form::new().part("file", part);
        let res = http
            .post(format!("{}/api/upload", notary.url()))
            .multipart(form)
            .send()
            .await
            .unwrap();
        statuses.push(res.status());

        if res.status() == StatusCode::CONFLICT {
            let body: serde_json::Value = res.json().await.unwrap();
            assert_eq!(body["success"], false);
            assert_eq!(
                body["message"],
                "This file has already been registered on blockchain."
            );
            assert_eq!(
                body["data"]["fileHash"],
                HashAlgorithm::Keccak256.digest(REPORT).to_hex()
            );
        }
    }
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    notary.stop();
}

#[tokio::test]
async fn test_qr_code_encodes_transaction_link() {
    let notary = common::start_notary(common::test_config()).await;

    let outcome = notary
        .client()
        .upload("invoice.pdf", b"%PDF-1.7 invoice 0042".to_vec())
        .await
        .unwrap();
    let UploadOutcome::Registered(receipt) = outcome else {
        panic!("expected a fresh registration");
    };

    assert_eq!(
        receipt.transaction_link,
        format!("https://amoy.polygonscan.com/tx/{}", receipt.transaction_id)
    );
    assert!(receipt.qr_code.starts_with("data:image/png;base64,"));
    assert_eq!(
        receipt.qr_code,
        qr_data_uri(&receipt.transaction_link).unwrap()
    );

    notary.stop();
}

#[tokio::test]
async fn test_sha256_algorithm() {
    let mut config = common::test_config();
    config.upload.hash_algorithm = HashAlgorithm::Sha256;
    let notary = common::start_notary(config).await;

    let outcome = notary.client().upload("a.bin", vec![0u8; 256]).await.unwrap();
    assert_eq!(
        outcome.file_hash(),
        HashAlgorithm::Sha256.digest(&[0u8; 256]).to_hex()
    );

    notary.stop();
}

#[tokio::test]
async fn test_attestation_lifecycle() {
    let notary = common::start_notary(common::test_config()).await;
    let client = notary.client();

    let hash = client
        .upload("audit.csv", b"site,emissions\nA,10\n".to_vec())
        .await
        .unwrap()
        .file_hash()
        .to_string();
    assert!(client.verify(&hash).await.unwrap());

    let status = client.status(&hash).await.unwrap();
    assert!(status.registered);
    assert!(!status.has_attestation);

    let attested = client.attest(&hash, true, "figures reconcile").await.unwrap();
    assert_eq!(attested.message, "Report attested");
    assert!(attested.link.ends_with(&attested.tx_hash));

    let status = client.status(&hash).await.unwrap();
    assert!(status.has_attestation && status.passed);
    assert_eq!(status.reason, "figures reconcile");
    assert_eq!(status.auditor, common::signer().to_checksum(None));

    let revoked = client.revoke(&hash, "restated").await.unwrap();
    assert_eq!(revoked.message, "Attestation revoked");
    assert_ne!(revoked.tx_hash, attested.tx_hash);

    let history = client.history(&hash).await.unwrap();
    let actions: Vec<_> = history.iter().map(|h| h.action.as_str()).collect();
    assert_eq!(actions, vec!["attest", "revoke"]);
    assert_eq!(history[1].reason, "restated");

    notary.stop();
}

#[tokio::test]
async fn test_attest_and_revoke_defaults() {
    let notary = common::start_notary(common::test_config()).await;
    let http = common::http_client();

    let hash = notary
        .client()
        .upload("defaults.txt", b"defaults".to_vec())
        .await
        .unwrap()
        .file_hash()
        .to_string();

    let res = http
        .post(format!("{}/api/attest", notary.url()))
        .json(&serde_json::json!({ "hash": hash }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = http
        .post(format!("{}/api/revoke", notary.url()))
        .json(&serde_json::json!({ "hash": hash }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let history = notary.client().history(&hash).await.unwrap();
    assert!(!history[0].passed);
    assert_eq!(history[0].reason, "");
    assert_eq!(history[1].reason, "revoked");

    notary.stop();
}

#[tokio::test]
async fn test_null_attest_fields_are_defaults() {
    let notary = common::start_notary(common::test_config()).await;

    let hash = notary
        .client()
        .upload("nulls.txt", b"null reason".to_vec())
        .await
        .unwrap()
        .file_hash()
        .to_string();

    let res = common::http_client()
        .post(format!("{}/api/attest", notary.url()))
        .json(&serde_json::json!({ "hash": hash, "passed": true, "reason": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::http_client()
        .post(format!("{}/api/attest", notary.url()))
        .json(&serde_json::json!({ "hash": hash, "passed": null, "reason": "second look" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let history = notary.client().history(&hash).await.unwrap();
    assert!(history[0].passed);
    assert_eq!(history[0].reason, "");
    assert!(!history[1].passed);
    assert_eq!(history[1].reason, "second look");

    notary.stop();
}

#[tokio::test]
async fn test_unknown_hash_reads() {
    let notary = common::start_notary(common::test_config()).await;
    let client = notary.client();
    let hash = HashAlgorithm::Keccak256.digest(b"never uploaded").to_hex();

    assert!(!client.verify(&hash).await.unwrap());
    assert!(!client.status(&hash).await.unwrap().registered);
    assert!(client.history(&hash).await.unwrap().is_empty());

    // Attesting something unregistered reverts; the raw reason comes back.
    let err = client.attest(&hash, true, "n/a").await.unwrap_err();
    match err {
        SdkError::Api { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Transaction reverted: Not registered");
        }
        other => panic!("unexpected error {:?}", other),
    }

    notary.stop();
}

#[tokio::test]
async fn test_admin_auditor_management() {
    let notary = common::start_notary(common::test_config()).await;
    let client = notary.client();
    let signer = common::signer().to_checksum(None);

    let hash = client
        .upload("gov.txt", b"board minutes".to_vec())
        .await
        .unwrap()
        .file_hash()
        .to_string();

    let err = client.set_auditor("wrong-key", &signer, false).await.unwrap_err();
    assert!(matches!(err, SdkError::Api { status, .. } if status == StatusCode::UNAUTHORIZED));

    let receipt = client
        .set_auditor(common::ADMIN_KEY, &signer, false)
        .await
        .unwrap();
    assert_eq!(receipt.message, "Auditor updated");

    let err = client.attest(&hash, true, "ok").await.unwrap_err();
    assert!(matches!(err, SdkError::Api { message, .. } if message.contains("Not an authorized auditor")));

    client
        .set_auditor(common::ADMIN_KEY, &signer, true)
        .await
        .unwrap();
    client.attest(&hash, true, "ok").await.unwrap();

    let status = client.admin_status(common::ADMIN_KEY).await.unwrap();
    assert_eq!(status["backend"], "memory");
    assert_eq!(status["chainId"], 31337);
    assert_eq!(status["signer"], signer);
    assert!(status["blockNumber"].as_u64().unwrap() >= 4);

    notary.stop();
}

#[tokio::test]
async fn test_health_and_concurrent_uploads() {
    let notary = common::start_notary(common::test_config()).await;

    let health = notary.client().health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.chain_reachable);

    let mut tasks = Vec::new();
    for i in 0..20u32 {
        let client = notary.client();
        tasks.push(tokio::spawn(async move {
            client
                .upload(&format!("reading-{}.json", i), format!("{{\"n\":{}}}", i).into_bytes())
                .await
        }));
    }

    let mut tx_ids = std::collections::HashSet::new();
    for task in tasks {
        match task.await.unwrap().unwrap() {
            UploadOutcome::Registered(receipt) => {
                assert!(tx_ids.insert(receipt.transaction_id));
            }
            other => panic!("unexpected duplicate {:?}", other),
        }
    }
    assert_eq!(tx_ids.len(), 20);

    notary.stop();
}
