// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use d2d_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("job is already running")]
    JobAlreadyRunning,
    #[error("no task created")]
    NoTask,
}

impl OrchestratorError {
    pub fn kind(&self) -> d2d_core::ErrorKind {
        match self {
            OrchestratorError::Core(error) => error.kind(),
            OrchestratorError::JobAlreadyRunning => d2d_core::ErrorKind::JobAlreadyRunning,
            OrchestratorError::NoTask => d2d_core::ErrorKind::NoTask,
        }
    }
}
