// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helper for the external backup utility (§4.12):
//! "modeled as an external collaborator invoked via `tokio::process::Command`".

use std::process::Output;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Upper bound on how long the backup utility may run before the
/// orchestrator gives up and kills it.
pub const BACKUP_UTILITY_TIMEOUT: Duration = Duration::from_secs(6 * 3600);

/// Wait for `child` to exit, killing it if `timeout` elapses first.
pub async fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!("{description} timed out after {}s", timeout.as_secs())),
    }
}

/// Run a subprocess command with a timeout, the non-streaming case.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!("{description} timed out after {}s", timeout.as_secs())),
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
