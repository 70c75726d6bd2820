// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn missing_store_without_token_is_not_bootstrapped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("creds.toml");
    let err = CredentialManager::ensure(&path, "https://127.0.0.1:1", "host", None, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, CredsError::NotBootstrapped));
}

#[tokio::test]
async fn missing_store_with_token_attempts_bootstrap() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("creds.toml");
    let err = CredentialManager::ensure(&path, "https://127.0.0.1:1", "host", Some("tok"), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, CredsError::Request(_) | CredsError::KeyGen(_)));
}

#[tokio::test]
async fn existing_store_is_loaded_without_bootstrapping() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("creds.toml");
    let certified = rcgen::generate_simple_self_signed(vec!["host".to_string()]).unwrap();
    let store = CredentialStore {
        key_pair_pem: certified.key_pair.serialize_pem(),
        cert_pem: certified.cert.pem(),
        ca_pem: certified.cert.pem(),
        issued_at_epoch_ms: 5,
    };
    store.save(&path).unwrap();

    let manager = CredentialManager::ensure(&path, "https://127.0.0.1:1", "host", None, 10)
        .await
        .unwrap();
    assert_eq!(manager.store().issued_at_epoch_ms, 5);
}
