// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exchange a one-time bootstrap token for a signed certificate (§4.6).
//!
//! Runs before any aRPC session exists: a plain HTTPS POST to the server's
//! bootstrap endpoint, carrying the CSR and the token the operator copied
//! from the server's target-registration UI. The response is the signed
//! leaf certificate plus the CA chain the agent will later use to verify
//! the server during the mTLS handshake (§4.1).

use crate::csr::generate_csr;
use crate::error::CredsError;
use crate::store::CredentialStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct BootstrapRequest<'a> {
    token: &'a str,
    csr_pem: &'a str,
}

#[derive(Debug, Deserialize)]
struct BootstrapResponse {
    cert_pem: String,
    ca_pem: String,
}

/// Bootstrap fresh credentials against `server_url` using `token` and
/// `common_name` (the agent's own hostname).
pub async fn bootstrap(
    client: &reqwest::Client,
    server_url: &str,
    token: &str,
    common_name: &str,
    now_epoch_ms: u64,
) -> Result<CredentialStore, CredsError> {
    let material = generate_csr(common_name)?;
    let url = format!("{}/plus/bootstrap", server_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .json(&BootstrapRequest { token, csr_pem: &material.csr_pem })
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        return Err(CredsError::Rejected { status, message });
    }

    let body: BootstrapResponse = response.json().await?;
    Ok(CredentialStore {
        key_pair_pem: material.key_pair_pem,
        cert_pem: body.cert_pem,
        ca_pem: body.ca_pem,
        issued_at_epoch_ms: now_epoch_ms,
    })
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
