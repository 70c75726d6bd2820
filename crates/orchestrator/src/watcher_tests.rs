// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn discovers_pre_existing_matching_file() {
    let dir = tempdir().unwrap();
    let key = search_key("store1", "job-1");
    let filename = format!("UPID:node1:1A:BEEF:3E8:5F5E1000:{key}:root@pam:");
    std::fs::write(dir.path().join(&filename), b"").unwrap();

    let upid = discover_task(dir.path(), "store1", "job-1", Duration::from_millis(200)).await;
    assert!(upid.is_some());
}

#[tokio::test]
async fn ignores_tmp_files_and_times_out() {
    let dir = tempdir().unwrap();
    let key = search_key("store1", "job-1");
    let filename = format!("UPID:node1:1A:BEEF:3E8:5F5E1000:{key}:root@pam:.tmp_x");
    std::fs::write(dir.path().join(&filename), b"").unwrap();

    let upid = discover_task(dir.path(), "store1", "job-1", Duration::from_millis(200)).await;
    assert!(upid.is_none());
}

#[tokio::test]
async fn ignores_non_matching_file_created_after_watch_starts() {
    let dir = tempdir().unwrap();
    let watch_dir = dir.path().to_path_buf();
    let handle = tokio::spawn(async move {
        discover_task(&watch_dir, "store1", "job-1", Duration::from_millis(500)).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(dir.path().join("unrelated.txt"), b"").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let key = search_key("store1", "job-1");
    let filename = format!("UPID:node1:1A:BEEF:3E8:5F5E1000:{key}:root@pam:");
    std::fs::write(dir.path().join(&filename), b"").unwrap();

    let upid = handle.await.unwrap();
    assert!(upid.is_some());
}
