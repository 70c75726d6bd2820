// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup orchestrator (§4.12, C12): "Orchestrator acquires per-job mutex →
//! instructs agent (via C3) to start a snapshot → agent creates VSS
//! snapshot (C7), starts AgentFS server bound to a new RPC router (C9) →
//! orchestrator mounts local FUSE view (C11) pointing into the agent →
//! spawns the external backup utility against the mount → task discovery
//! (C13) captures the utility's task id → on completion, agent tears down
//! AgentFS + snapshot → orchestrator releases the mutex and reports final
//! status."
//!
//! The steps owned by other crates (snapshot, mount, the backup utility
//! itself) are trait boundaries here so this crate doesn't depend on them
//! directly; `d2d-agent`/`d2d-server` wire in the real implementations.

use crate::error::OrchestratorError;
use crate::filelock::FileLock;
use crate::state::JobState;
use crate::upid::Upid;
use crate::watcher::{discover_task, TASK_DISCOVERY_DEADLINE};
use async_trait::async_trait;
use d2d_core::{CoreError, ErrorKind, JobId, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Starts the agent-side snapshot + AgentFS server for a job and tears it
/// down on completion. Implemented by `d2d-server` against the aRPC
/// session, kept as a trait so this crate has no transport dependency.
#[async_trait]
pub trait AgentSession: Send + Sync {
    async fn start_snapshot(&self, job_id: &str) -> Result<(), OrchestratorError>;
    async fn teardown_snapshot(&self, job_id: &str) -> Result<(), OrchestratorError>;
}

/// Mounts the agent's exposed filesystem locally. Implemented by
/// `d2d-mount`'s FUSE adapter.
#[async_trait]
pub trait MountHandle: Send + Sync {
    async fn mount(&self, job_id: &str) -> Result<PathBuf, OrchestratorError>;
    async fn unmount(&self, job_id: &str) -> Result<(), OrchestratorError>;
}

/// One backup run's parameters and outcome.
#[derive(Debug, Clone)]
pub struct JobRun {
    pub job_id: JobId,
    pub datastore: String,
    pub backup_id: String,
    pub utility_command: String,
    pub task_log_dir: PathBuf,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub state: JobState,
    pub task: Option<Upid>,
    pub error: Option<String>,
}

/// Drives jobs through [`JobState`], holding a per-job file lock (§4.12,
/// §5) so a second concurrent run for the same job id — even from another
/// orchestrator process — fails fast with
/// [`OrchestratorError::JobAlreadyRunning`] instead of racing the first.
pub struct Orchestrator {
    session: Arc<dyn AgentSession>,
    mount: Arc<dyn MountHandle>,
    lock_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(session: Arc<dyn AgentSession>, mount: Arc<dyn MountHandle>) -> Self {
        Self { session, mount, lock_dir: std::env::temp_dir() }
    }

    /// Overrides the directory lock files are created in (`/<tmp>/...` by
    /// default). Tests use a private tempdir so runs don't contend with
    /// unrelated processes' locks on the same machine.
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    fn job_lock(&self, job_id: &JobId) -> FileLock {
        FileLock::job(&self.lock_dir, job_id.as_str())
    }

    fn global_mount_lock(&self) -> FileLock {
        FileLock::global_mount(&self.lock_dir)
    }

    #[instrument(skip(self, run), fields(job_id = %run.job_id))]
    pub async fn run(&self, run: JobRun) -> Result<JobOutcome, OrchestratorError> {
        let _guard = self.job_lock(&run.job_id).try_lock().map_err(|_| OrchestratorError::JobAlreadyRunning)?;

        let mut attempts = 0;
        loop {
            let outcome = match self.run_locked(&run).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(job_id = %run.job_id, %error, "job failed");
                    JobOutcome { state: JobState::Failed, task: None, error: Some(error.to_string()) }
                }
            };

            if outcome.state != JobState::Failed {
                return Ok(outcome);
            }
            if !run.retry.allows_attempt(attempts) {
                return Ok(JobOutcome { state: JobState::SurfaceError, ..outcome });
            }
            attempts += 1;
            warn!(job_id = %run.job_id, attempts, "retrying after backoff");
            tokio::time::sleep(Duration::from_secs(run.retry.retry_interval_secs)).await;
        }
    }

    async fn run_locked(&self, run: &JobRun) -> Result<JobOutcome, OrchestratorError> {
        let job_id = run.job_id.as_str();

        info!(job_id, "mounting");
        self.session.start_snapshot(job_id).await?;
        let mount_point = {
            let _mount_guard = self.global_mount_lock().lock().await.map_err(|e| {
                OrchestratorError::Core(CoreError::new(ErrorKind::Invalid, format!("acquiring mount mutex: {e}")))
            })?;
            self.mount.mount(job_id).await?
        };

        info!(job_id, "starting backup utility");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&run.utility_command).env("D2D_MOUNT_POINT", &mount_point);
        let mut child = cmd.spawn().map_err(|e| {
            OrchestratorError::Core(CoreError::new(ErrorKind::NoTask, format!("spawning backup utility: {e}")))
        })?;

        info!(job_id, "running, waiting for task discovery");
        let task = discover_task(&run.task_log_dir, &run.datastore, &run.backup_id, TASK_DISCOVERY_DEADLINE)
            .await;

        let task = match task {
            Some(task) => task,
            None => {
                let _ = child.kill().await;
                self.teardown(job_id).await;
                return Err(OrchestratorError::NoTask);
            }
        };

        let status = child.wait().await.map_err(|e| {
            OrchestratorError::Core(CoreError::new(ErrorKind::NoTask, format!("waiting for backup utility: {e}")))
        })?;

        self.teardown(job_id).await;

        let state = if status.success() { JobState::Succeeded } else { JobState::Failed };
        Ok(JobOutcome { state, task: Some(task), error: None })
    }

    async fn teardown(&self, job_id: &str) {
        if let Err(error) = self.mount.unmount(job_id).await {
            warn!(job_id, %error, "unmount failed during teardown");
        }
        if let Err(error) = self.session.teardown_snapshot(job_id).await {
            warn!(job_id, %error, "snapshot teardown failed");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
