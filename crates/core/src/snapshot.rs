// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot records (§3). The managers that create/delete snapshots live in
//! `d2d-snapshot`; this is the persisted record shape shared with the
//! registry and with the orchestrator's cleanup bookkeeping.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which concrete mechanism produced a [`SnapshotRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Host-side volume shadow copy (§4.7).
    Vss,
    Btrfs,
    Zfs,
    Lvm,
}

crate::simple_display! {
    HandlerKind {
        Vss => "vss",
        Btrfs => "btrfs",
        Zfs => "zfs",
        Lvm => "lvm",
    }
}

/// Opaque identifier for a snapshot, unique within its handler kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point-in-time snapshot: the read-only root exposed to AgentFS/the mount,
/// and the live source path it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Root path of the snapshot itself (symlink directory on the host,
    /// mount point under the appliance for source-side handlers).
    pub path: PathBuf,
    pub source_path: PathBuf,
    pub id: SnapshotId,
    pub time_started_epoch_ms: u64,
    /// True when the filesystem supports reading the live source directly
    /// without a distinct snapshot step (rare; kept for parity with upstream
    /// "direct" mode where snapshotting is a no-op).
    #[serde(default)]
    pub direct: bool,
    pub handler_kind: HandlerKind,
}

impl SnapshotRecord {
    /// The stable registry key this snapshot is persisted under, so a
    /// crashed process can find and clean up its own orphans at restart.
    pub fn registry_key(job_id: &str) -> String {
        format!("d2d-snapshot-{job_id}")
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
