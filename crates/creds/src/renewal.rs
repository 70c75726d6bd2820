// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hourly certificate renewal (§4.6): once bootstrapped, the agent no longer
//! needs the one-time token — it authenticates the renewal call with its
//! own current client certificate.

use crate::error::CredsError;
use crate::store::CredentialStore;
use serde::Deserialize;
use std::time::Duration;

pub const RENEWAL_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct RenewalResponse {
    cert_pem: String,
    ca_pem: String,
}

/// Build an mTLS-capable client authenticating with `store`'s current cert.
pub fn mtls_client(store: &CredentialStore) -> Result<reqwest::Client, CredsError> {
    let identity_pem = format!("{}\n{}", store.cert_pem, store.key_pair_pem);
    let identity = reqwest::Identity::from_pem(identity_pem.as_bytes())?;
    Ok(reqwest::Client::builder().identity(identity).build()?)
}

/// Renew `store`'s certificate against `server_url`, returning the updated
/// store. The key pair is reused; only the leaf certificate is replaced.
pub async fn renew_once(
    store: &CredentialStore,
    server_url: &str,
    now_epoch_ms: u64,
) -> Result<CredentialStore, CredsError> {
    let client = mtls_client(store)?;
    let url = format!("{}/plus/renew", server_url.trim_end_matches('/'));
    let response = client.post(&url).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        return Err(CredsError::Rejected { status, message });
    }

    let body: RenewalResponse = response.json().await?;
    Ok(CredentialStore {
        key_pair_pem: store.key_pair_pem.clone(),
        cert_pem: body.cert_pem,
        ca_pem: body.ca_pem,
        issued_at_epoch_ms: now_epoch_ms,
    })
}

#[cfg(test)]
#[path = "renewal_tests.rs"]
mod tests;
