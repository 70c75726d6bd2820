// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed boundary to the external config store (§6.4). The store's own
//! on-disk format and migration logic are out of scope; this module only
//! defines the shapes the core reads from / writes through that boundary.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors loading or saving a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("writing {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },
    #[error("parsing {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
    #[error("serialising config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Agent-side persisted configuration (§6.4): the server URL to dial and a
/// one-time bootstrap token, consumed by `d2d-creds` on first start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    pub server_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_token: Option<String>,
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .map_err(|source| ConfigError::Write { path: path.display().to_string(), source })
    }

    /// Clear the one-time bootstrap token after it has been exchanged for a
    /// certificate (§4.6): it must not be reused or left on disk.
    pub fn consume_bootstrap_token(&mut self) -> Option<String> {
        self.bootstrap_token.take()
    }
}

/// Minimal typed view of a target's config-store entry the core needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub path: String,
}

/// Minimal typed view of a job's config-store entry the core needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub id: String,
    pub target: String,
    #[serde(default)]
    pub sub_path: Option<String>,
    pub datastore: String,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
