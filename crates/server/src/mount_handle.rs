// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`d2d_orchestrator::MountHandle`] backed by a real FUSE mount (§4.11,
//! C11): for a job id, resolves which agent session backs it, clones a
//! private [`d2d_transport::Session`] out of it for the mount's own
//! [`d2d_mount::TransportFsClient`], and spawns a read-only `fuser` mount
//! under the configured mount root. Unmounting drops the `BackgroundSession`,
//! which `fuser` turns into the actual `umount(2)` call.

use crate::jobs::{JobSpec, JobSpecError};
use crate::session_manager::SessionManager;
use async_trait::async_trait;
use d2d_core::{CoreError, ErrorKind};
use d2d_mount::{AgentFsClient, D2dFuseFs, TransportFsClient};
use d2d_orchestrator::{MountHandle, OrchestratorError};
use fuser::{BackgroundSession, MountOption};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

impl From<JobSpecError> for OrchestratorError {
    fn from(error: JobSpecError) -> Self {
        CoreError::invalid(error.to_string()).into()
    }
}

/// Mounts jobs under `mount_root/<jobId>`, one FUSE session per job.
pub struct FuseMountHandle {
    mount_root: PathBuf,
    sessions: SessionManager,
    jobs: HashMap<String, JobSpec>,
    mounted: Mutex<HashMap<String, BackgroundSession>>,
}

impl FuseMountHandle {
    pub fn new(mount_root: PathBuf, sessions: SessionManager, jobs: HashMap<String, JobSpec>) -> Self {
        Self { mount_root, sessions, jobs, mounted: Mutex::new(HashMap::new()) }
    }

    fn spec(&self, job_id: &str) -> Result<&JobSpec, OrchestratorError> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no job spec for {job_id}")).into())
    }

    fn mount_point(&self, job_id: &str) -> PathBuf {
        self.mount_root.join(job_id)
    }
}

#[async_trait]
impl MountHandle for FuseMountHandle {
    async fn mount(&self, job_id: &str) -> Result<PathBuf, OrchestratorError> {
        let spec = self.spec(job_id)?;
        let agent_path = spec.agent_path()?;
        let managed = self.sessions.get(&agent_path.host).ok_or_else(|| {
            OrchestratorError::from(CoreError::new(
                ErrorKind::Transport,
                format!("agent {} is not connected", agent_path.host),
            ))
        })?;
        let session = managed.session.lock().await.clone();
        managed.track_job(job_id);

        let client: Arc<dyn AgentFsClient> = Arc::new(TransportFsClient::new(session, job_id));
        let fs = D2dFuseFs::new(client, tokio::runtime::Handle::current());

        let mount_point = self.mount_point(job_id);
        std::fs::create_dir_all(&mount_point).map_err(|source| {
            CoreError::new(ErrorKind::Invalid, format!("creating mount point: {source}"))
        })?;

        let options = vec![MountOption::RO, MountOption::FSName("d2d".to_string())];
        let background = fuser::spawn_mount2(fs, &mount_point, &options)
            .map_err(|source| CoreError::new(ErrorKind::Invalid, format!("mounting FUSE filesystem: {source}")))?;
        info!(job_id, mount_point = %mount_point.display(), "mounted job");

        self.mounted.lock().insert(job_id.to_string(), background);
        Ok(mount_point)
    }

    async fn unmount(&self, job_id: &str) -> Result<(), OrchestratorError> {
        if let Some(background) = self.mounted.lock().remove(job_id) {
            drop(background);
            info!(job_id, "unmounted job");
        }
        if let Ok(spec) = self.spec(job_id) {
            if let Ok(agent_path) = spec.agent_path() {
                if let Some(managed) = self.sessions.get(&agent_path.host) {
                    managed.untrack_job(job_id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mount_handle_tests.rs"]
mod tests;
