// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source-side snapshot manager (§4.8): dispatches to a snapshot handler by
//! the detected filesystem type of the backup source.

use crate::error::SnapshotError;
use crate::types::Snapshot;
use async_trait::async_trait;
use d2d_core::ErrorKind;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Filesystem type as detected from `/proc/mounts`, per §4.8's dispatch
/// table. `Ext4`/`Xfs` delegate to the LVM handler; `Ntfs`/`Refs` are
/// host-side (handled by [`crate::host`], never reach this dispatch);
/// `Fat32`/`ExFat`/`HfsPlus` have no snapshot mechanism available here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsType {
    Btrfs,
    Zfs,
    Lvm,
    Ext4,
    Xfs,
    Ntfs,
    Refs,
    Fat32,
    ExFat,
    HfsPlus,
}

impl FsType {
    /// Maps a `/proc/mounts` fstype column to a [`FsType`], or `None` for
    /// anything not named in §4.8's table.
    pub fn from_mount_fstype(fstype: &str) -> Option<Self> {
        match fstype {
            "btrfs" => Some(FsType::Btrfs),
            "zfs" => Some(FsType::Zfs),
            "lvm" => Some(FsType::Lvm),
            "ext4" => Some(FsType::Ext4),
            "xfs" => Some(FsType::Xfs),
            "ntfs" | "ntfs3" => Some(FsType::Ntfs),
            "refs" => Some(FsType::Refs),
            "vfat" | "fat32" => Some(FsType::Fat32),
            "exfat" => Some(FsType::ExFat),
            "hfsplus" => Some(FsType::HfsPlus),
            _ => None,
        }
    }

    /// The handler key this filesystem type dispatches to. `ext4`/`xfs`
    /// delegate to the LVM handler (§4.8: "ext4/xfs delegate to LVM").
    fn handler_key(self) -> HandlerKey {
        match self {
            FsType::Btrfs => HandlerKey::Btrfs,
            FsType::Zfs => HandlerKey::Zfs,
            FsType::Lvm | FsType::Ext4 | FsType::Xfs => HandlerKey::Lvm,
            FsType::Ntfs | FsType::Refs | FsType::Fat32 | FsType::ExFat | FsType::HfsPlus => {
                HandlerKey::Unsupported
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HandlerKey {
    Btrfs,
    Zfs,
    Lvm,
    Unsupported,
}

/// One filesystem-specific snapshot mechanism (§4.8: `CreateSnapshot`,
/// `DeleteSnapshot`, `IsSupported`).
#[async_trait]
pub trait SnapshotHandler: Send + Sync {
    async fn create_snapshot(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError>;
    async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<(), SnapshotError>;
    fn is_supported(&self, source_path: &str) -> bool;
}

struct UnsupportedHandler;

#[async_trait]
impl SnapshotHandler for UnsupportedHandler {
    async fn create_snapshot(&self, _job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        Err(SnapshotError::new(ErrorKind::Unsupported, "no snapshot mechanism for this filesystem")
            .with_path(source_path))
    }

    async fn delete_snapshot(&self, _snapshot: &Snapshot) -> Result<(), SnapshotError> {
        Ok(())
    }

    fn is_supported(&self, _source_path: &str) -> bool {
        false
    }
}

/// Parses `/proc/mounts` and returns the filesystem type of the mount point
/// that is the longest prefix match of `source_path` — the same "longest
/// matching mount" rule `df`/`mount` use to resolve a path to its mount.
pub fn detect_fs_type(proc_mounts: &str, source_path: &Path) -> Option<FsType> {
    let source_path = source_path.to_string_lossy();
    let mut best: Option<(usize, &str)> = None;
    for line in proc_mounts.lines() {
        let mut fields = line.split_whitespace();
        let (Some(mount_point), Some(fstype)) = (fields.next(), fields.nth(1)) else {
            continue;
        };
        if source_path.starts_with(mount_point)
            && best.map(|(len, _)| mount_point.len() > len).unwrap_or(true)
        {
            best = Some((mount_point.len(), fstype));
        }
    }
    best.and_then(|(_, fstype)| FsType::from_mount_fstype(fstype))
}

/// Dispatch table keyed by filesystem type (§4.8). The handler set is
/// closed at compile time; only filesystem detection is dynamic.
pub struct SourceSnapshotManager {
    handlers: HashMap<HandlerKey, Box<dyn SnapshotHandler>>,
}

impl SourceSnapshotManager {
    pub fn new(
        btrfs: Box<dyn SnapshotHandler>,
        zfs: Box<dyn SnapshotHandler>,
        lvm: Box<dyn SnapshotHandler>,
    ) -> Self {
        let mut handlers: HashMap<HandlerKey, Box<dyn SnapshotHandler>> = HashMap::new();
        handlers.insert(HandlerKey::Btrfs, btrfs);
        handlers.insert(HandlerKey::Zfs, zfs);
        handlers.insert(HandlerKey::Lvm, lvm);
        handlers.insert(HandlerKey::Unsupported, Box::new(UnsupportedHandler));
        Self { handlers }
    }

    fn handler_for(&self, fs_type: Option<FsType>) -> &dyn SnapshotHandler {
        let key = fs_type.map(FsType::handler_key).unwrap_or(HandlerKey::Unsupported);
        self.handlers.get(&key).map(|h| h.as_ref()).unwrap_or(&UnsupportedHandler)
    }

    pub async fn create(
        &self,
        job_id: &str,
        source_path: &str,
        fs_type: Option<FsType>,
    ) -> Result<Snapshot, SnapshotError> {
        let handler = self.handler_for(fs_type);
        if !handler.is_supported(source_path) {
            return Err(SnapshotError::new(ErrorKind::Unsupported, "target filesystem is unsupported")
                .with_path(source_path));
        }
        info!(%job_id, %source_path, ?fs_type, "creating source-side snapshot");
        handler.create_snapshot(job_id, source_path).await
    }

    pub async fn delete(&self, snapshot: &Snapshot, fs_type: Option<FsType>) -> Result<(), SnapshotError> {
        self.handler_for(fs_type).delete_snapshot(snapshot).await
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
