// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingHandler {
    supported: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SnapshotHandler for CountingHandler {
    async fn create_snapshot(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Snapshot {
            path: format!("/snap/{job_id}"),
            source_path: source_path.into(),
            id: job_id.into(),
            time_started_epoch_ms: 0,
        })
    }

    async fn delete_snapshot(&self, _snapshot: &Snapshot) -> Result<(), SnapshotError> {
        Ok(())
    }

    fn is_supported(&self, _source_path: &str) -> bool {
        self.supported
    }
}

fn handler(supported: bool) -> Box<dyn SnapshotHandler> {
    Box::new(CountingHandler { supported, calls: Arc::new(AtomicUsize::new(0)) })
}

#[test]
fn ext4_and_xfs_dispatch_to_lvm() {
    assert_eq!(FsType::Ext4.handler_key(), HandlerKey::Lvm);
    assert_eq!(FsType::Xfs.handler_key(), HandlerKey::Lvm);
    assert_eq!(FsType::Lvm.handler_key(), HandlerKey::Lvm);
}

#[test]
fn host_side_and_unsupported_types_dispatch_to_unsupported() {
    for fs in [FsType::Ntfs, FsType::Refs, FsType::Fat32, FsType::ExFat, FsType::HfsPlus] {
        assert_eq!(fs.handler_key(), HandlerKey::Unsupported);
    }
}

#[test]
fn detect_fs_type_picks_longest_matching_mount() {
    let mounts = "/dev/sda1 / ext4 rw 0 0\n/dev/sdb1 /srv/data btrfs rw 0 0\n";
    let detected = detect_fs_type(mounts, Path::new("/srv/data/backups/job1"));
    assert_eq!(detected, Some(FsType::Btrfs));
}

#[test]
fn detect_fs_type_unknown_fstype_is_none() {
    let mounts = "/dev/sda1 / weirdfs rw 0 0\n";
    assert_eq!(detect_fs_type(mounts, Path::new("/etc/passwd")), None);
}

#[tokio::test]
async fn unsupported_filesystem_is_rejected_before_handler_runs() {
    let manager = SourceSnapshotManager::new(handler(false), handler(true), handler(true));
    let error = manager.create("job-1", "/mnt/fat", Some(FsType::Fat32)).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unsupported);
}

#[tokio::test]
async fn supported_filesystem_dispatches_to_its_handler() {
    let manager = SourceSnapshotManager::new(handler(true), handler(false), handler(false));
    let snapshot = manager.create("job-1", "/mnt/btrfs", Some(FsType::Btrfs)).await.unwrap();
    assert_eq!(snapshot.id, "job-1");
}

#[tokio::test]
async fn ext4_dispatches_to_lvm_handler() {
    let manager = SourceSnapshotManager::new(handler(false), handler(false), handler(true));
    let snapshot = manager.create("job-1", "/mnt/ext4", Some(FsType::Ext4)).await.unwrap();
    assert_eq!(snapshot.source_path, "/mnt/ext4");
}
