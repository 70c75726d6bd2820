// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target: a named backup source (§3).

use serde::{Deserialize, Serialize};

/// Filesystem/connection metadata reported by an agent for its drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DriveMeta {
    pub fs_type: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

/// Connection status of an `agent://` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
    Unreachable,
}

crate::simple_display! {
    ConnectionStatus {
        Disconnected => "disconnected",
        Connected => "connected",
        Unreachable => "unreachable",
    }
}

/// Error returned when a target's path fails the `agent://` invariant (§3).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTargetPath {
    #[error("agent path {0:?} must be agent://<host-or-ip>/<single-drive-letter>")]
    MalformedAgentPath(String),
    #[error("local path {0:?} must be absolute")]
    RelativeLocalPath(String),
}

/// A parsed `agent://host/drive` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPath {
    pub host: String,
    pub drive: char,
}

impl AgentPath {
    /// Parse `agent://<host-or-ip>/<single-drive-letter>`.
    pub fn parse(path: &str) -> Result<Self, InvalidTargetPath> {
        let rest = path
            .strip_prefix("agent://")
            .ok_or_else(|| InvalidTargetPath::MalformedAgentPath(path.to_string()))?;
        let (host, drive_part) = rest
            .split_once('/')
            .ok_or_else(|| InvalidTargetPath::MalformedAgentPath(path.to_string()))?;
        let mut drive_chars = drive_part.chars();
        let drive = drive_chars
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(|| InvalidTargetPath::MalformedAgentPath(path.to_string()))?;
        if host.is_empty() || drive_chars.next().is_some() {
            return Err(InvalidTargetPath::MalformedAgentPath(path.to_string()));
        }
        Ok(Self { host: host.to_string(), drive })
    }
}

/// A named backup source (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub path: String,
    pub agent_version: Option<String>,
    #[serde(default)]
    pub connection_status: ConnectionStatus,
    /// Base64-encoded signed certificate issued to this target, once enrolled.
    pub auth_cert: Option<String>,
    /// One-time bootstrap token used to register (cleared after use).
    pub registration_token: Option<String>,
    #[serde(default)]
    pub drive_meta: DriveMeta,
}

impl Target {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Result<Self, InvalidTargetPath> {
        let path = path.into();
        Self::validate_path(&path)?;
        Ok(Self {
            name: name.into(),
            path,
            agent_version: None,
            connection_status: ConnectionStatus::default(),
            auth_cert: None,
            registration_token: None,
            drive_meta: DriveMeta::default(),
        })
    }

    pub fn is_agent(&self) -> bool {
        self.path.starts_with("agent://")
    }

    pub fn agent_path(&self) -> Option<AgentPath> {
        self.is_agent().then(|| AgentPath::parse(&self.path).ok()).flatten()
    }

    fn validate_path(path: &str) -> Result<(), InvalidTargetPath> {
        if path.starts_with("agent://") {
            AgentPath::parse(path)?;
            Ok(())
        } else if std::path::Path::new(path).is_absolute() {
            Ok(())
        } else {
            Err(InvalidTargetPath::RelativeLocalPath(path.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
