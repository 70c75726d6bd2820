// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-side job/target configuration (§6.4): the coordinator's view of
//! which jobs exist, which target each names, and the parameters needed to
//! build a [`d2d_orchestrator::JobRun`] for one.

use d2d_core::config::{JobConfig, TargetConfig};
use d2d_core::target::{AgentPath, InvalidTargetPath};
use d2d_core::RetryPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobSpecError {
    #[error("job {0:?} names unknown target {1:?}")]
    UnknownTarget(String, String),
    #[error("target {0:?} is not a valid agent:// path")]
    NotAnAgentTarget(String, #[source] InvalidTargetPath),
}

/// A job joined with its resolved target, enough to build a
/// [`d2d_orchestrator::JobRun`] and dial the right agent (§3, §6.4).
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub job: JobConfig,
    pub target: TargetConfig,
}

impl JobSpec {
    /// The `agent://host/drive` this job's target resolves to.
    pub fn agent_path(&self) -> Result<AgentPath, JobSpecError> {
        AgentPath::parse(&self.target.path)
            .map_err(|error| JobSpecError::NotAnAgentTarget(self.target.path.clone(), error))
    }
}

/// The coordinator's config-store view (§6.4): listen address, TLS
/// material, the mount root jobs are exposed under, the backup utility to
/// drive, and the job/target set it knows how to run.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tls_cert_path: PathBuf,
    pub tls_key_path: PathBuf,
    pub ca_cert_path: PathBuf,
    pub mount_root: PathBuf,
    pub task_log_dir: PathBuf,
    /// Command template for the external backup utility (§4.12); the mount
    /// point is appended as its final argument by the caller.
    pub utility_command: String,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
}

impl ServerConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Joins every configured job to its target by name.
    pub fn job_specs(&self) -> Result<Vec<JobSpec>, JobSpecError> {
        self.jobs
            .iter()
            .map(|job| {
                let target = self
                    .targets
                    .iter()
                    .find(|target| target.name == job.target)
                    .cloned()
                    .ok_or_else(|| JobSpecError::UnknownTarget(job.id.clone(), job.target.clone()))?;
                Ok(JobSpec { job: job.clone(), target })
            })
            .collect()
    }
}
