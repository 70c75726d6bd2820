// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess helper shared by the concrete §4.8 snapshot handlers
//! (btrfs/zfs/lvm all shell out to their respective CLI tools).

use crate::error::SnapshotError;
use d2d_core::ErrorKind;
use std::time::Duration;
use tokio::process::Command;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Run `cmd`, mapping a non-zero exit or a timeout to a `SnapshotCreation`
/// error carrying the command's stderr.
pub async fn run(mut cmd: Command, description: &str) -> Result<(), SnapshotError> {
    let output = tokio::time::timeout(COMMAND_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            SnapshotError::new(ErrorKind::SnapshotTimeout, format!("{description} timed out"))
        })?
        .map_err(|e| SnapshotError::new(ErrorKind::SnapshotCreation, format!("{description}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SnapshotError::new(
            ErrorKind::SnapshotCreation,
            format!("{description} failed: {stderr}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
