// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders, enabled via the `test-support` feature so downstream
//! crates' tests can construct fixtures without hand-rolling every field.

use crate::id::{JobId, TargetId};
use crate::job::Job;
use crate::target::Target;

/// Builder for test `Job` fixtures with sensible defaults.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: &str, target: &str) -> Self {
        Self {
            job: Job::new(
                JobId::new(id).expect("valid test job id"),
                TargetId::new(target).expect("valid test target id"),
                "store1",
            ),
        }
    }

    pub fn retries(mut self, max_retries: u32, interval_secs: u64) -> Self {
        self.job.retry.max_retries = max_retries;
        self.job.retry.retry_interval_secs = interval_secs;
        self
    }

    pub fn datastore(mut self, datastore: impl Into<String>) -> Self {
        self.job.datastore = datastore.into();
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

/// Build a test `Target` pointing at a local absolute path.
pub fn local_target(name: &str, path: &str) -> Target {
    Target::new(name, path).expect("valid test target path")
}

/// Build a test `Target` pointing at an agent drive.
pub fn agent_target(name: &str, host: &str, drive: char) -> Target {
    Target::new(name, format!("agent://{host}/{drive}")).expect("valid test agent path")
}
