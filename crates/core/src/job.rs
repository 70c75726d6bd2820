// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job: a named, validated backup specification (§3).

use crate::error::CoreError;
use crate::exclusion::Exclusion;
use crate::id::JobId;
use crate::target::TargetId;
use serde::{Deserialize, Serialize};

/// How aggressively completion notifications are sent for a job's runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    Always,
    #[default]
    OnFailure,
    Never,
}

crate::simple_display! {
    NotificationMode {
        Always => "always",
        OnFailure => "on-failure",
        Never => "never",
    }
}

/// Whether a job reads through a point-in-time snapshot or the live source
/// directly. `Direct` skips §4.7/§4.8 snapshot creation entirely and is only
/// sound for sources that are already static for the run's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    #[default]
    Snapshot,
    Direct,
}

crate::simple_display! {
    SourceMode {
        Snapshot => "snapshot",
        Direct => "direct",
    }
}

/// Retry policy: how many times to retry a failed run, and the backoff
/// between attempts (§4.12's `FAILED --attempts < retry--> wait retryInterval`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_interval_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 0, retry_interval_secs: 60 }
    }
}

impl RetryPolicy {
    pub fn allows_attempt(&self, attempts_so_far: u32) -> bool {
        attempts_so_far < self.max_retries
    }
}

/// A job's most recent internal failure, kept alongside a timestamp so users
/// can see the last error even after a subsequent successful run (§7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub error: CoreError,
    pub at_epoch_ms: u64,
}

/// A named, validated backup specification (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub target: TargetId,
    pub sub_path: Option<String>,
    /// Calendar/cron schedule expression; parsing/dispatch is the scheduler's
    /// concern, out of scope for the core.
    pub schedule: Option<String>,
    pub datastore: String,
    pub namespace: Option<String>,
    pub retry: RetryPolicy,
    pub comment: String,
    pub notification_mode: NotificationMode,
    pub source_mode: SourceMode,
    /// PID of the orchestrator's spawned backup-utility process, while running.
    pub current_pid: Option<u32>,
    pub last_run_task_id: Option<String>,
    pub last_successful_task_id: Option<String>,
    pub last_error: Option<LastError>,
    pub exclusions: Vec<Exclusion>,
}

impl Job {
    pub fn new(id: JobId, target: TargetId, datastore: impl Into<String>) -> Self {
        Self {
            id,
            target,
            sub_path: None,
            schedule: None,
            datastore: datastore.into(),
            namespace: None,
            retry: RetryPolicy::default(),
            comment: String::new(),
            notification_mode: NotificationMode::default(),
            source_mode: SourceMode::default(),
            current_pid: None,
            last_run_task_id: None,
            last_successful_task_id: None,
            last_error: None,
            exclusions: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.current_pid.is_some()
    }

    pub fn mark_started(&mut self, pid: u32) {
        self.current_pid = Some(pid);
    }

    pub fn mark_succeeded(&mut self, task_id: impl Into<String>) {
        let task_id = task_id.into();
        self.current_pid = None;
        self.last_run_task_id = Some(task_id.clone());
        self.last_successful_task_id = Some(task_id);
    }

    /// Record a failed run. The error and timestamp persist even after a
    /// later success clears `current_pid` (§7: "stored with a timestamp so
    /// users can see the most recent failure even after a subsequent success").
    pub fn mark_failed(&mut self, task_id: Option<String>, error: CoreError, at_epoch_ms: u64) {
        self.current_pid = None;
        if let Some(task_id) = task_id {
            self.last_run_task_id = Some(task_id);
        }
        self.last_error = Some(LastError { error, at_epoch_ms });
    }

    /// This job's own exclusions plus whichever of `global` apply to it, in
    /// the order supplied. `global` is typically the shared exclusion table
    /// the config store owns; this job's `exclusions` field holds entries
    /// created specifically against it.
    pub fn applicable_exclusions<'a>(&'a self, global: &'a [Exclusion]) -> Vec<&'a Exclusion> {
        self.exclusions
            .iter()
            .chain(global.iter().filter(|e| e.applies_to(self.id.as_str())))
            .collect()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
