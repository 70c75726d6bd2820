// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted registry of known snapshots (§4.7): "a platform registry under
//! a fixed key as a JSON array; a corrupt value is deleted and treated as
//! empty." The platform registry itself (Windows registry key, etc.) is out
//! of scope — this models the boundary as a JSON file, the same shape the
//! config store uses elsewhere in this workspace.

use crate::types::Snapshot;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File-backed stand-in for the platform registry key named in §4.7.
pub struct SnapshotRegistry {
    path: PathBuf,
    entries: Mutex<Vec<Snapshot>>,
}

impl SnapshotRegistry {
    /// Open the registry at `path`, loading existing entries. A corrupt
    /// file is treated as empty and overwritten on the next `save`.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<Snapshot>>(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(path = %path.display(), %error, "corrupt snapshot registry, treating as empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path: path.to_path_buf(), entries: Mutex::new(entries) }
    }

    fn persist(&self, entries: &[Snapshot]) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(raw) = serde_json::to_string_pretty(entries) {
            let _ = std::fs::write(&self.path, raw);
        }
    }

    pub fn list(&self) -> Vec<Snapshot> {
        self.entries.lock().clone()
    }

    pub fn get(&self, path: &str) -> Option<Snapshot> {
        self.entries.lock().iter().find(|s| s.path == path).cloned()
    }

    pub fn save(&self, snapshot: Snapshot) {
        let mut entries = self.entries.lock();
        entries.retain(|s| s.path != snapshot.path);
        entries.push(snapshot);
        self.persist(&entries);
    }

    /// Idempotent: removing an absent path is not an error.
    pub fn delete_by_path(&self, path: &str) {
        let mut entries = self.entries.lock();
        entries.retain(|s| s.path != path);
        self.persist(&entries);
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
