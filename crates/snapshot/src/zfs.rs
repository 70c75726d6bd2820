// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ZFS handler (§4.8): `zfs snapshot <dataset>@<jobId>`, exposed through
//! ZFS's built-in `.zfs/snapshot/<name>` browse directory rather than a
//! clone, since that directory is already a read-only, mountable view with
//! no extra dataset lifecycle to manage.

use crate::command::run;
use crate::error::SnapshotError;
use crate::source::SnapshotHandler;
use crate::types::Snapshot;
use async_trait::async_trait;
use d2d_core::ErrorKind;
use std::path::Path;
use tokio::process::Command;

pub struct ZfsHandler;

impl ZfsHandler {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the ZFS dataset name backing `path` via `zfs list`.
    async fn dataset_for(&self, path: &str) -> Result<String, SnapshotError> {
        let output = Command::new("zfs")
            .args(["list", "-H", "-o", "name"])
            .arg(path)
            .output()
            .await
            .map_err(|e| SnapshotError::new(ErrorKind::SnapshotCreation, format!("zfs list: {e}")))?;
        if !output.status.success() {
            return Err(SnapshotError::new(
                ErrorKind::SnapshotCreation,
                format!("zfs list: {}", String::from_utf8_lossy(&output.stderr)),
            ));
        }
        String::from_utf8(output.stdout)
            .map(|s| s.trim().to_string())
            .map_err(|e| SnapshotError::new(ErrorKind::SnapshotCreation, e.to_string()))
    }
}

impl Default for ZfsHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotHandler for ZfsHandler {
    async fn create_snapshot(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        let dataset = self.dataset_for(source_path).await?;
        let mut cmd = Command::new("zfs");
        cmd.arg("snapshot").arg(format!("{dataset}@{job_id}"));
        run(cmd, "zfs snapshot").await?;

        let path = Path::new(source_path).join(".zfs").join("snapshot").join(job_id);
        Ok(Snapshot {
            path: path.to_string_lossy().into_owned(),
            source_path: source_path.to_string(),
            id: job_id.to_string(),
            time_started_epoch_ms: now_epoch_ms(),
        })
    }

    async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let dataset = self.dataset_for(&snapshot.source_path).await?;
        let mut cmd = Command::new("zfs");
        cmd.arg("destroy").arg(format!("{dataset}@{}", snapshot.id));
        run(cmd, "zfs destroy").await
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
#[path = "zfs_tests.rs"]
mod tests;
