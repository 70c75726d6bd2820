// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk persistence for issued TLS material (§4.6).

use crate::error::CredsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStore {
    pub key_pair_pem: String,
    pub cert_pem: String,
    pub ca_pem: String,
    pub issued_at_epoch_ms: u64,
}

impl CredentialStore {
    pub fn load(path: &Path) -> Result<Self, CredsError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| CredsError::Read { path: path.display().to_string(), source })?;
        toml::from_str(&raw).map_err(|source| CredsError::Parse { path: path.display().to_string(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), CredsError> {
        let raw = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::write(path, raw)
            .map_err(|source| CredsError::Write { path: path.display().to_string(), source })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
