// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use d2d_snapshot::SnapshotHandler;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

struct FakeHandler {
    creates: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

#[async_trait]
impl SnapshotHandler for FakeHandler {
    async fn create_snapshot(&self, job_id: &str, source_path: &str) -> Result<Snapshot, CoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(Snapshot {
            path: source_path.to_string(),
            source_path: source_path.to_string(),
            id: job_id.to_string(),
            time_started_epoch_ms: 0,
        })
    }

    async fn delete_snapshot(&self, _snapshot: &Snapshot) -> Result<(), CoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_supported(&self, _source_path: &str) -> bool {
        true
    }
}

fn registry(target: &str, creates: Arc<AtomicUsize>, deletes: Arc<AtomicUsize>) -> (JobRegistry, PathBuf) {
    let dir = tempdir().unwrap();
    let mounts_path = dir.path().join("mounts");
    std::fs::write(&mounts_path, format!("/dev/sdb1 {target} btrfs rw 0 0\n")).unwrap();

    let handlers = d2d_snapshot::SourceSnapshotManager::new(
        Box::new(FakeHandler { creates, deletes }),
        Box::new(d2d_snapshot::ZfsHandler::new()),
        Box::new(d2d_snapshot::LvmHandler::new(dir.path())),
    );

    let mut jobs = HashMap::new();
    jobs.insert(
        "job-1".to_string(),
        JobConfig { id: "job-1".to_string(), target: target.to_string(), sub_path: None, datastore: "ds".into() },
    );

    (JobRegistry::new(Arc::new(handlers), jobs, mounts_path), dir.path().to_path_buf())
}

#[tokio::test]
async fn start_creates_snapshot_and_agentfs_server() {
    let dir = tempdir().unwrap();
    let creates = Arc::new(AtomicUsize::new(0));
    let deletes = Arc::new(AtomicUsize::new(0));
    let (registry, _guard) = registry(&dir.path().to_string_lossy(), creates.clone(), deletes.clone());

    registry.start("job-1").await.unwrap();
    assert_eq!(creates.load(Ordering::SeqCst), 1);
    assert!(registry.server_for("job-1").await.is_some());
}

#[tokio::test]
async fn start_is_idempotent_for_an_already_active_job() {
    let dir = tempdir().unwrap();
    let creates = Arc::new(AtomicUsize::new(0));
    let deletes = Arc::new(AtomicUsize::new(0));
    let (registry, _guard) = registry(&dir.path().to_string_lossy(), creates.clone(), deletes.clone());

    registry.start("job-1").await.unwrap();
    registry.start("job-1").await.unwrap();
    assert_eq!(creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn teardown_removes_the_agentfs_server_and_deletes_the_snapshot() {
    let dir = tempdir().unwrap();
    let creates = Arc::new(AtomicUsize::new(0));
    let deletes = Arc::new(AtomicUsize::new(0));
    let (registry, _guard) = registry(&dir.path().to_string_lossy(), creates.clone(), deletes.clone());

    registry.start("job-1").await.unwrap();
    registry.teardown("job-1").await.unwrap();
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
    assert!(registry.server_for("job-1").await.is_none());
}

#[tokio::test]
async fn start_for_unknown_job_fails() {
    let dir = tempdir().unwrap();
    let creates = Arc::new(AtomicUsize::new(0));
    let deletes = Arc::new(AtomicUsize::new(0));
    let (registry, _guard) = registry(&dir.path().to_string_lossy(), creates, deletes);

    let error = registry.start("no-such-job").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Invalid);
}
