// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy (spec §7).
//!
//! `ErrorKind` is the tagged, wire-serialisable error classification used
//! everywhere a failure needs to cross a process boundary: AgentFS handler
//! results, snapshot manager results, and the orchestrator's per-job error
//! record. Callers test by `kind()`, never by matching on `message` text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical error kind, stable across the wire.
///
/// Matches the table in spec §7: `Transport`/`CircuitOpen`/`Timeout` are
/// transport-local (raised by C1/C3); `NotExist`/`Permission`/`Invalid` are
/// AgentFS os-error categories (raised by C9); `Unsupported` covers
/// unsupported snapshot targets (C7/C8); `SnapshotCreation`/`SnapshotTimeout`/
/// `InvalidSnapshot` are snapshot-manager failures; `NoTask`/`JobAlreadyRunning`
/// are orchestrator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    CircuitOpen,
    SessionClosed,
    Timeout,
    NotExist,
    Permission,
    Invalid,
    Unsupported,
    SnapshotCreation,
    SnapshotTimeout,
    InvalidSnapshot,
    NoTask,
    JobAlreadyRunning,
}

crate::simple_display! {
    ErrorKind {
        Transport => "transport",
        CircuitOpen => "circuit_open",
        SessionClosed => "session_closed",
        Timeout => "timeout",
        NotExist => "not_exist",
        Permission => "permission",
        Invalid => "invalid",
        Unsupported => "unsupported",
        SnapshotCreation => "snapshot_creation",
        SnapshotTimeout => "snapshot_timeout",
        InvalidSnapshot => "invalid_snapshot",
        NoTask => "no_task",
        JobAlreadyRunning => "job_already_running",
    }
}

impl ErrorKind {
    /// The wire `errorType` string for the three AgentFS os-error kinds that
    /// the client reconstructs into a matching local error (§7). Other kinds
    /// don't have a conventional os-error-type name and fall back to their
    /// [`Display`] form.
    pub fn wire_error_type(self) -> &'static str {
        match self {
            ErrorKind::NotExist => "os.ErrNotExist",
            ErrorKind::Permission => "os.ErrPermission",
            ErrorKind::Invalid => "os.PathError",
            _ => "error",
        }
    }
}

/// A classified, serialisable error with an optional `op`/`path` (populated
/// for AgentFS filesystem errors) and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.op, &self.path) {
            (Some(op), Some(path)) => {
                write!(f, "{}: {} ({}: {})", self.kind, self.message, op, path)
            }
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), op: None, path: None }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn not_exist(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(ErrorKind::NotExist, format!("no such file or directory: {path}")).with_path(path)
    }

    pub fn permission(op: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, "permission denied").with_op(op).with_path(path)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
