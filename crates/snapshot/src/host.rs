// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host snapshot manager (§4.7): VSS shadow copies on Windows, persisted
//! through a [`SnapshotRegistry`].

use crate::error::SnapshotError;
use crate::registry::SnapshotRegistry;
use crate::types::Snapshot;
use d2d_core::{Clock, ErrorKind, SystemClock};
use std::time::Duration;
use tracing::{info, warn};

/// §4.7's retry policy: up to 2 attempts; an "already in progress" failure
/// (the VSS service reregistering shadow-copy writers) is retried every
/// second until the overall deadline elapses.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_INTERVAL: Duration = Duration::from_secs(1);
const RETRY_DEADLINE: Duration = Duration::from_secs(60);

/// A single shadow-copy creation attempt. Swappable so non-Windows builds
/// and tests don't need a real VSS writer.
pub trait ShadowCopyBackend: Send + Sync {
    fn create(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError>;
    fn delete(&self, snapshot: &Snapshot) -> Result<(), SnapshotError>;
}

/// [`ShadowCopyBackend`] for non-Windows hosts: VSS doesn't exist here, so
/// every call reports `Unsupported` immediately (no retry, since this isn't
/// a transient failure).
pub struct UnsupportedBackend;

impl ShadowCopyBackend for UnsupportedBackend {
    fn create(&self, _job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        Err(SnapshotError::new(ErrorKind::Unsupported, "VSS is only available on Windows hosts")
            .with_path(source_path))
    }

    fn delete(&self, _snapshot: &Snapshot) -> Result<(), SnapshotError> {
        Err(SnapshotError::new(ErrorKind::Unsupported, "VSS is only available on Windows hosts"))
    }
}

fn is_already_in_progress(error: &SnapshotError) -> bool {
    error.message.contains("already in progress")
}

pub struct HostSnapshotManager<C: Clock = SystemClock> {
    backend: Box<dyn ShadowCopyBackend>,
    registry: SnapshotRegistry,
    clock: C,
}

impl HostSnapshotManager<SystemClock> {
    pub fn new(backend: Box<dyn ShadowCopyBackend>, registry: SnapshotRegistry) -> Self {
        Self::with_clock(backend, registry, SystemClock)
    }
}

impl<C: Clock> HostSnapshotManager<C> {
    pub fn with_clock(backend: Box<dyn ShadowCopyBackend>, registry: SnapshotRegistry, clock: C) -> Self {
        Self { backend, registry, clock }
    }

    /// Create a shadow copy of `source_path` for `job_id`, retrying per
    /// §4.7's policy, and persist the result in the registry.
    pub async fn create(&self, job_id: &str, source_path: &str) -> Result<Snapshot, SnapshotError> {
        let deadline = self.clock.now() + RETRY_DEADLINE;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.backend.create(job_id, source_path) {
                Ok(snapshot) => {
                    info!(%job_id, %source_path, snapshot_id = %snapshot.id, "created host snapshot");
                    self.registry.save(snapshot.clone());
                    return Ok(snapshot);
                }
                Err(error) if is_already_in_progress(&error) && self.clock.now() < deadline => {
                    warn!(%job_id, attempt, "shadow copy service busy, retrying");
                    tokio::time::sleep(RETRY_INTERVAL).await;
                    continue;
                }
                Err(error) if attempt < MAX_ATTEMPTS => {
                    warn!(%job_id, attempt, %error, "shadow copy creation failed, retrying");
                    continue;
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub async fn delete(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        self.backend.delete(snapshot)?;
        self.registry.delete_by_path(&snapshot.path);
        Ok(())
    }

    pub fn list(&self) -> Vec<Snapshot> {
        self.registry.list()
    }

    pub fn get(&self, path: &str) -> Option<Snapshot> {
        self.registry.get(path)
    }

    pub fn save(&self, snapshot: Snapshot) {
        self.registry.save(snapshot);
    }

    pub fn delete_by_path(&self, path: &str) {
        self.registry.delete_by_path(path);
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
