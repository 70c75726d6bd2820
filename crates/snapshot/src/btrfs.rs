// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Btrfs handler (§4.8): a read-only subvolume snapshot taken with
//! `btrfs subvolume snapshot -r`, rooted under `snapshot_root`.

use crate::command::run;
use crate::error::SnapshotError;
use crate::source::SnapshotHandler;
use crate::types::Snapshot;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub struct BtrfsHandler {
    snapshot_root: PathBuf,
}

impl BtrfsHandler {
    pub fn new(snapshot_root: impl Into<PathBuf>) -> Self {
        Self { snapshot_root: snapshot_root.into() }
    }

    fn snapshot_path(&self, job_id: &str) -> PathBuf {
        self.snapshot_root.join(job_id)
    }
}

#[async_trait]
impl SnapshotHandler for BtrfsHandler {
    async fn create_snapshot(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        let target = self.snapshot_path(job_id);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SnapshotError::new(d2d_core::ErrorKind::SnapshotCreation, e.to_string()))?;
        }

        let mut cmd = Command::new("btrfs");
        cmd.args(["subvolume", "snapshot", "-r", source_path]).arg(&target);
        run(cmd, "btrfs subvolume snapshot").await?;

        Ok(Snapshot {
            path: target.to_string_lossy().into_owned(),
            source_path: source_path.to_string(),
            id: job_id.to_string(),
            time_started_epoch_ms: now_epoch_ms(),
        })
    }

    async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut cmd = Command::new("btrfs");
        cmd.args(["subvolume", "delete"]).arg(&snapshot.path);
        run(cmd, "btrfs subvolume delete").await
    }

    fn is_supported(&self, source_path: &str) -> bool {
        Path::new(source_path).exists()
    }
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "btrfs_tests.rs"]
mod tests;
