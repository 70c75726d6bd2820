// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-lock mutual exclusion (§4.12, §5): the per-job mutex and the global
//! mount-setup mutex are `flock`-based file locks at deterministic paths
//! rather than in-process locks, so two orchestrator processes (not just two
//! tasks in one process) can't run the same job or race mount setup.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A lock file at a fixed path. Held open for the lifetime of
/// [`FileLockGuard`]; dropping the guard closes the file, which releases the
/// `flock` automatically.
pub struct FileLock {
    path: PathBuf,
}

pub struct FileLockGuard {
    _file: File,
}

impl FileLock {
    /// `/<tmp>/pbs-plus-mutex-job-<jobId>`.
    pub fn job(lock_dir: &Path, job_id: &str) -> Self {
        Self { path: lock_dir.join(format!("pbs-plus-mutex-job-{job_id}")) }
    }

    /// `/<tmp>/pbs-plus-mutex-lock`, serialising mount setup across jobs.
    pub fn global_mount(lock_dir: &Path) -> Self {
        Self { path: lock_dir.join("pbs-plus-mutex-lock") }
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().write(true).create(true).truncate(false).open(&self.path)
    }

    /// Non-blocking: a job already running (or a concurrent mount already in
    /// flight) is reported immediately rather than waited on (§4.12: "a
    /// failed TryLock returns 'a job is still running' without retrying").
    pub fn try_lock(&self) -> io::Result<FileLockGuard> {
        let file = self.open()?;
        file.try_lock_exclusive()?;
        Ok(FileLockGuard { _file: file })
    }

    /// Blocks until the lock is acquired. Used for the global mount mutex,
    /// which is held only for the duration of mount preparation rather than
    /// failing fast like the per-job mutex. Runs on a blocking thread since
    /// `flock` has no async variant.
    pub async fn lock(&self) -> io::Result<FileLockGuard> {
        let path = self.path.clone();
        match tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new().write(true).create(true).truncate(false).open(&path)?;
            file.lock_exclusive()?;
            Ok::<_, io::Error>(FileLockGuard { _file: file })
        })
        .await
        {
            Ok(result) => result,
            Err(join_error) => Err(io::Error::new(io::ErrorKind::Other, join_error)),
        }
    }
}

#[cfg(test)]
#[path = "filelock_tests.rs"]
mod tests;
