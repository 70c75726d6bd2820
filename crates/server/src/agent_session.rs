// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`d2d_orchestrator::AgentSession`] backed by a live aRPC session (§6.2):
//! `start_snapshot`/`teardown_snapshot` map onto the agent's bare `backup`/
//! `cleanup` methods, resolved to the right connected agent by the job's
//! target hostname.

use crate::jobs::JobSpec;
use crate::session_manager::SessionManager;
use async_trait::async_trait;
use d2d_core::{CoreError, ErrorKind};
use d2d_orchestrator::{AgentSession, OrchestratorError};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
struct DriveParams<'a> {
    #[serde(rename = "jobId")]
    job_id: &'a str,
    drive: String,
}

/// Drives `backup`/`cleanup` on whichever agent a job's target names.
pub struct RemoteAgentSession {
    sessions: SessionManager,
    jobs: HashMap<String, JobSpec>,
}

impl RemoteAgentSession {
    pub fn new(sessions: SessionManager, jobs: HashMap<String, JobSpec>) -> Self {
        Self { sessions, jobs }
    }

    fn spec(&self, job_id: &str) -> Result<&JobSpec, OrchestratorError> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no job spec for {job_id}")).into())
    }

    async fn call(&self, job_id: &str, method: &str) -> Result<(), OrchestratorError> {
        let spec = self.spec(job_id)?;
        let agent_path = spec.agent_path().map_err(|error| CoreError::invalid(error.to_string()))?;
        let managed = self.sessions.get(&agent_path.host).ok_or_else(|| {
            CoreError::new(ErrorKind::Transport, format!("agent {} is not connected", agent_path.host))
        })?;
        let params = DriveParams { job_id, drive: agent_path.drive.to_string() };
        let _: String = managed.session.lock().await.call(method, params).await?;
        Ok(())
    }
}

#[async_trait]
impl AgentSession for RemoteAgentSession {
    async fn start_snapshot(&self, job_id: &str) -> Result<(), OrchestratorError> {
        self.call(job_id, "backup").await
    }

    async fn teardown_snapshot(&self, job_id: &str) -> Result<(), OrchestratorError> {
        self.call(job_id, "cleanup").await
    }
}

#[cfg(test)]
#[path = "agent_session_tests.rs"]
mod tests;
