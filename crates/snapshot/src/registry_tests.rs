// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn sample(path: &str) -> Snapshot {
    Snapshot {
        path: path.into(),
        source_path: "/srv/data".into(),
        id: "snap-1".into(),
        time_started_epoch_ms: 1,
    }
}

#[test]
fn missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let registry = SnapshotRegistry::open(&dir.path().join("registry.json"));
    assert!(registry.list().is_empty());
}

#[test]
fn save_then_get_round_trips() {
    let dir = tempdir().unwrap();
    let registry = SnapshotRegistry::open(&dir.path().join("registry.json"));
    registry.save(sample("/mnt/snap1"));
    assert_eq!(registry.get("/mnt/snap1"), Some(sample("/mnt/snap1")));
    assert_eq!(registry.list().len(), 1);
}

#[test]
fn save_is_loaded_by_a_fresh_handle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registry.json");
    SnapshotRegistry::open(&path).save(sample("/mnt/snap1"));
    let reopened = SnapshotRegistry::open(&path);
    assert_eq!(reopened.list().len(), 1);
}

#[test]
fn delete_by_path_is_idempotent() {
    let dir = tempdir().unwrap();
    let registry = SnapshotRegistry::open(&dir.path().join("registry.json"));
    registry.save(sample("/mnt/snap1"));
    registry.delete_by_path("/mnt/snap1");
    registry.delete_by_path("/mnt/snap1");
    assert!(registry.list().is_empty());
}

#[test]
fn corrupt_file_is_treated_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registry.json");
    std::fs::write(&path, "not json").unwrap();
    let registry = SnapshotRegistry::open(&path);
    assert!(registry.list().is_empty());
}
