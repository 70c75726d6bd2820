// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps agent hostname to its live session (§4.13, line: "A `SessionManager`
//! maps agent-hostname → live session... Duplicate connects from the same
//! hostname close and replace the prior session. On disconnect the entry is
//! removed and any per-agent mounts are unmounted.").
//!
//! This type only tracks which job ids were mounted through a session; it
//! has no dependency on [`crate::mount_handle::FuseMountHandle`] itself, so
//! construction order between the two doesn't matter. The caller driving
//! the accept loop ([`crate::listener`]) is responsible for unmounting the
//! job ids a disconnect or replacement orphans.

use d2d_transport::{MuxError, Session};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// One connected agent: its outbound RPC session, the task driving its
/// muxed connection, and the job ids currently mounted through it.
pub struct ManagedSession {
    pub session: tokio::sync::Mutex<Session>,
    driver: JoinHandle<Result<(), MuxError>>,
    jobs: Mutex<HashSet<String>>,
}

impl ManagedSession {
    pub fn track_job(&self, job_id: &str) {
        self.jobs.lock().insert(job_id.to_string());
    }

    pub fn untrack_job(&self, job_id: &str) {
        self.jobs.lock().remove(job_id);
    }
}

/// Tracks the one live [`ManagedSession`] per connected agent hostname.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<String, Arc<ManagedSession>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self { sessions: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Registers a freshly upgraded connection for `hostname`. If an agent
    /// with the same hostname is already connected, its prior session's
    /// driver is aborted and the job ids it had mounted are returned for
    /// the caller to unmount.
    pub fn register(
        &self,
        hostname: &str,
        session: Session,
        driver: JoinHandle<Result<(), MuxError>>,
    ) -> (Arc<ManagedSession>, Vec<String>) {
        let managed = Arc::new(ManagedSession {
            session: tokio::sync::Mutex::new(session),
            driver,
            jobs: Mutex::new(HashSet::new()),
        });

        let previous = self.sessions.lock().insert(hostname.to_string(), managed.clone());
        let orphaned = match previous {
            Some(previous) => {
                info!(%hostname, "agent reconnected, replacing prior session");
                Self::retire(&previous)
            }
            None => Vec::new(),
        };
        (managed, orphaned)
    }

    /// Removes `hostname`'s session (on disconnect) and returns the job ids
    /// that were mounted through it, for the caller to unmount.
    pub fn remove(&self, hostname: &str) -> Vec<String> {
        match self.sessions.lock().remove(hostname) {
            Some(session) => {
                info!(%hostname, "agent disconnected");
                Self::retire(&session)
            }
            None => Vec::new(),
        }
    }

    pub fn get(&self, hostname: &str) -> Option<Arc<ManagedSession>> {
        self.sessions.lock().get(hostname).cloned()
    }

    fn retire(session: &Arc<ManagedSession>) -> Vec<String> {
        session.driver.abort();
        session.jobs.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
