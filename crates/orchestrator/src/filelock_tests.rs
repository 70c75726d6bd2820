// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn try_lock_succeeds_when_uncontended() {
    let dir = tempfile::tempdir().unwrap();
    let lock = FileLock::job(dir.path(), "job-a");
    let _guard = lock.try_lock().unwrap();
}

#[test]
fn try_lock_fails_while_another_guard_holds_it() {
    let dir = tempfile::tempdir().unwrap();
    let lock = FileLock::job(dir.path(), "job-a");
    let _first = lock.try_lock().unwrap();
    let second = FileLock::job(dir.path(), "job-a").try_lock();
    assert!(second.is_err(), "a second try_lock on the same job id must fail while the first is held");
}

#[test]
fn dropping_the_guard_releases_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let lock = FileLock::job(dir.path(), "job-a");
    {
        let _guard = lock.try_lock().unwrap();
    }
    let _reacquired = lock.try_lock().unwrap();
}

#[test]
fn different_job_ids_do_not_contend() {
    let dir = tempfile::tempdir().unwrap();
    let _a = FileLock::job(dir.path(), "job-a").try_lock().unwrap();
    let _b = FileLock::job(dir.path(), "job-b").try_lock().unwrap();
}

#[tokio::test]
async fn global_mount_lock_blocks_until_released() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let first = FileLock::global_mount(&path).try_lock().unwrap();

    let waiter_path = path.clone();
    let waiter = tokio::spawn(async move { FileLock::global_mount(&waiter_path).lock().await });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!waiter.is_finished(), "waiter should still be blocked on the held lock");

    drop(first);
    let result = waiter.await.unwrap();
    assert!(result.is_ok());
}
