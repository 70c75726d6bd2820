// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LVM handler (§4.8): also used by ext4/xfs sources (§4.8's dispatch table
//! delegates both to this handler). Resolves the logical volume backing
//! `source_path`, takes a copy-on-write `lvcreate --snapshot`, and mounts it
//! read-only under `snapshot_root`.

use crate::command::run;
use crate::error::SnapshotError;
use crate::source::SnapshotHandler;
use crate::types::Snapshot;
use async_trait::async_trait;
use d2d_core::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub struct LvmHandler {
    snapshot_root: PathBuf,
}

impl LvmHandler {
    pub fn new(snapshot_root: impl Into<PathBuf>) -> Self {
        Self { snapshot_root: snapshot_root.into() }
    }

    fn mount_point(&self, job_id: &str) -> PathBuf {
        self.snapshot_root.join(job_id)
    }

    fn snapshot_lv_name(job_id: &str) -> String {
        format!("d2d-{job_id}")
    }

    async fn source_device(&self, source_path: &str) -> Result<String, SnapshotError> {
        let output = Command::new("findmnt")
            .args(["-n", "-o", "SOURCE", "--target"])
            .arg(source_path)
            .output()
            .await
            .map_err(|e| SnapshotError::new(ErrorKind::SnapshotCreation, format!("findmnt: {e}")))?;
        if !output.status.success() {
            return Err(SnapshotError::new(
                ErrorKind::SnapshotCreation,
                format!("findmnt: {}", String::from_utf8_lossy(&output.stderr)),
            ));
        }
        String::from_utf8(output.stdout)
            .map(|s| s.trim().to_string())
            .map_err(|e| SnapshotError::new(ErrorKind::SnapshotCreation, e.to_string()))
    }
}

/// `/dev/<vg>/<lv>` -> `(vg, lv)`. LVM device-mapper paths always have this
/// shape once `findmnt` resolves the mapper symlink.
fn parse_vg_lv(device: &str) -> Option<(&str, &str)> {
    let trimmed = device.trim_start_matches("/dev/");
    let (vg, lv) = trimmed.split_once('/')?;
    if vg.is_empty() || lv.is_empty() {
        return None;
    }
    Some((vg, lv))
}

#[async_trait]
impl SnapshotHandler for LvmHandler {
    async fn create_snapshot(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        let device = self.source_device(source_path).await?;
        let (vg, _lv) = parse_vg_lv(&device).ok_or_else(|| {
            SnapshotError::new(ErrorKind::SnapshotCreation, format!("{device} is not an LVM device"))
        })?;

        let snap_name = Self::snapshot_lv_name(job_id);
        let mut cmd = Command::new("lvcreate");
        cmd.args(["--size", "5G", "--snapshot", "--name", &snap_name]).arg(&device);
        run(cmd, "lvcreate").await?;

        let mount_point = self.mount_point(job_id);
        std::fs::create_dir_all(&mount_point)
            .map_err(|e| SnapshotError::new(ErrorKind::SnapshotCreation, e.to_string()))?;

        let mut cmd = Command::new("mount");
        cmd.args(["-o", "ro"]).arg(format!("/dev/{vg}/{snap_name}")).arg(&mount_point);
        run(cmd, "mount").await?;

        Ok(Snapshot {
            path: mount_point.to_string_lossy().into_owned(),
            source_path: source_path.to_string(),
            id: job_id.to_string(),
            time_started_epoch_ms: now_epoch_ms(),
        })
    }

    async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut cmd = Command::new("umount");
        cmd.arg(&snapshot.path);
        run(cmd, "umount").await?;

        let device = self.source_device(&snapshot.source_path).await?;
        let (vg, _lv) = parse_vg_lv(&device).ok_or_else(|| {
            SnapshotError::new(ErrorKind::SnapshotCreation, format!("{device} is not an LVM device"))
        })?;
        let snap_name = Self::snapshot_lv_name(&snapshot.id);

        let mut cmd = Command::new("lvremove");
        cmd.args(["--force"]).arg(format!("/dev/{vg}/{snap_name}"));
        run(cmd, "lvremove").await
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
#[path = "lvm_tests.rs"]
mod tests;
