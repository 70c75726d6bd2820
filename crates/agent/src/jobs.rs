// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job lifecycle: `start` creates a source-side snapshot (§4.8) and
//! stands up an [`AgentFsServer`] rooted at it; `teardown` tears both back
//! down. The orchestrator (run by `d2d-server`) drives this lifecycle over
//! the wire via the bare `backup`/`cleanup` methods [`handlers`] registers.

use d2d_agentfs::AgentFsServer;
use d2d_core::config::JobConfig;
use d2d_core::{CoreError, ErrorKind};
use d2d_snapshot::{detect_fs_type, Snapshot, SourceSnapshotManager};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A job whose snapshot has been created and whose AgentFS server is live.
pub struct RegisteredJob {
    pub server: Arc<AgentFsServer>,
    pub snapshot: Snapshot,
}

/// Tracks the active [`RegisteredJob`]s for this agent process, keyed by job
/// id. `jobs` is the static job-id-to-source-path table loaded from the
/// agent's on-disk config (§6.4); `snapshots` dispatches snapshot creation
/// by detected filesystem type.
pub struct JobRegistry {
    snapshots: Arc<SourceSnapshotManager>,
    jobs: HashMap<String, JobConfig>,
    proc_mounts_path: PathBuf,
    active: Mutex<HashMap<String, RegisteredJob>>,
}

impl JobRegistry {
    pub fn new(
        snapshots: Arc<SourceSnapshotManager>,
        jobs: HashMap<String, JobConfig>,
        proc_mounts_path: impl Into<PathBuf>,
    ) -> Self {
        Self { snapshots, jobs, proc_mounts_path: proc_mounts_path.into(), active: Mutex::new(HashMap::new()) }
    }

    fn job_config(&self, job_id: &str) -> Result<&JobConfig, CoreError> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| CoreError::new(ErrorKind::Invalid, format!("unknown job: {job_id}")))
    }

    /// Creates the source-side snapshot for `job_id`'s target and stands up
    /// an `AgentFsServer` rooted at the snapshot path. A repeat call for a
    /// job already active is a no-op (the orchestrator may retry).
    pub async fn start(&self, job_id: &str) -> Result<(), CoreError> {
        let mut active = self.active.lock().await;
        if active.contains_key(job_id) {
            return Ok(());
        }

        let job = self.job_config(job_id)?;
        let source_path = match &job.sub_path {
            Some(sub) => format!("{}/{sub}", job.target.trim_end_matches('/')),
            None => job.target.clone(),
        };

        let proc_mounts = std::fs::read_to_string(&self.proc_mounts_path).unwrap_or_default();
        let fs_type = detect_fs_type(&proc_mounts, Path::new(&source_path));

        let snapshot = self.snapshots.create(job_id, &source_path, fs_type).await?;
        info!(job_id, root = %snapshot.path, "agentfs server starting");
        let server = Arc::new(AgentFsServer::new(snapshot.path.clone()));
        active.insert(job_id.to_string(), RegisteredJob { server, snapshot });
        Ok(())
    }

    /// Tears down `job_id`'s `AgentFsServer` and deletes its snapshot.
    pub async fn teardown(&self, job_id: &str) -> Result<(), CoreError> {
        let mut active = self.active.lock().await;
        let Some(job) = active.remove(job_id) else {
            return Ok(());
        };
        job.server.shutdown();

        let job_cfg = self.job_config(job_id)?;
        let source_path = job.snapshot.source_path.clone();
        let proc_mounts = std::fs::read_to_string(&self.proc_mounts_path).unwrap_or_default();
        let fs_type = detect_fs_type(&proc_mounts, Path::new(&source_path));
        let _ = job_cfg;
        self.snapshots.delete(&job.snapshot, fs_type).await?;
        info!(job_id, "agentfs server torn down");
        Ok(())
    }

    /// The live `AgentFsServer` for `job_id`, if `start` has run.
    pub async fn server_for(&self, job_id: &str) -> Option<Arc<AgentFsServer>> {
        self.active.lock().await.get(job_id).map(|job| job.server.clone())
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
