// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusion records (§3). Pattern syntax and matching live in `d2d-excludes`;
//! this type is just the persisted/transmitted record shape.

use serde::{Deserialize, Serialize};

/// A single exclusion rule: `(job id or empty for global, path pattern, comment)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Empty string means this exclusion applies to every job.
    #[serde(default)]
    pub job_id: String,
    pub pattern: String,
    #[serde(default)]
    pub comment: String,
}

impl Exclusion {
    pub fn global(pattern: impl Into<String>, comment: impl Into<String>) -> Self {
        Self { job_id: String::new(), pattern: pattern.into(), comment: comment.into() }
    }

    pub fn scoped(job_id: impl Into<String>, pattern: impl Into<String>, comment: impl Into<String>) -> Self {
        Self { job_id: job_id.into(), pattern: pattern.into(), comment: comment.into() }
    }

    pub fn is_global(&self) -> bool {
        self.job_id.is_empty()
    }

    /// Whether this exclusion applies to the given job (global, or scoped to
    /// exactly that job id).
    pub fn applies_to(&self, job_id: &str) -> bool {
        self.is_global() || self.job_id == job_id
    }
}

#[cfg(test)]
#[path = "exclusion_tests.rs"]
mod tests;
