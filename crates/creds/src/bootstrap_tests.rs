// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn bootstrap_request_serialises_token_and_csr() {
    let req = BootstrapRequest { token: "one-time", csr_pem: "-----BEGIN CERTIFICATE REQUEST-----" };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["token"], "one-time");
    assert_eq!(value["csr_pem"], "-----BEGIN CERTIFICATE REQUEST-----");
}

#[test]
fn bootstrap_response_deserialises_cert_and_ca() {
    let raw = r#"{"cert_pem": "cert", "ca_pem": "ca"}"#;
    let resp: BootstrapResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(resp.cert_pem, "cert");
    assert_eq!(resp.ca_pem, "ca");
}

#[tokio::test]
async fn rejected_bootstrap_surfaces_status_and_body() {
    let client = reqwest::Client::new();
    // No server listening on this port: the connection itself fails, which
    // bootstrap() must propagate as CredsError::Request rather than panic.
    let err = bootstrap(&client, "https://127.0.0.1:1", "tok", "host", 0).await.unwrap_err();
    assert!(matches!(err, CredsError::Request(_) | CredsError::KeyGen(_)));
}
