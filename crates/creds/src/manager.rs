// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties bootstrap, on-disk persistence and renewal into the single
//! operation the agent binary calls at startup and on its renewal tick
//! (§4.6).

use crate::bootstrap::bootstrap;
use crate::error::CredsError;
use crate::renewal::renew_once;
use crate::store::CredentialStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads or bootstraps the agent's [`CredentialStore`] and keeps it renewed.
pub struct CredentialManager {
    path: PathBuf,
    server_url: String,
    store: CredentialStore,
}

impl CredentialManager {
    /// Load existing credentials from `path`, or bootstrap fresh ones using
    /// `bootstrap_token` if none are on disk yet. Fails with
    /// [`CredsError::NotBootstrapped`] if neither is available.
    pub async fn ensure(
        path: &Path,
        server_url: &str,
        common_name: &str,
        bootstrap_token: Option<&str>,
        now_epoch_ms: u64,
    ) -> Result<Self, CredsError> {
        let store = match CredentialStore::load(path) {
            Ok(store) => {
                info!(path = %path.display(), "loaded existing credentials");
                store
            }
            Err(CredsError::Read { .. }) => {
                let token = bootstrap_token.ok_or(CredsError::NotBootstrapped)?;
                info!(%server_url, "bootstrapping fresh credentials");
                let client = reqwest::Client::new();
                let store = bootstrap(&client, server_url, token, common_name, now_epoch_ms).await?;
                store.save(path)?;
                store
            }
            Err(other) => return Err(other),
        };

        Ok(Self { path: path.to_path_buf(), server_url: server_url.to_string(), store })
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Renew the certificate against the server and persist the result.
    /// The key pair is kept; only the leaf certificate is replaced.
    pub async fn renew(&mut self, now_epoch_ms: u64) -> Result<(), CredsError> {
        let renewed = renew_once(&self.store, &self.server_url, now_epoch_ms).await?;
        renewed.save(&self.path)?;
        self.store = renewed;
        Ok(())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
