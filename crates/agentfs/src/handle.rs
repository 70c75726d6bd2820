// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent file-handle table (§4.9.1): a monotonic id generator seeded
//! at server start, and a map the router can hit concurrently from many
//! in-flight requests.

use d2d_core::CoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct OpenHandle {
    pub file: File,
    pub path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
}

#[derive(Default)]
pub struct HandleTable {
    next_id: AtomicU64,
    handles: RwLock<HashMap<u64, Arc<OpenHandle>>>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(1), handles: RwLock::new(HashMap::new()) }
    }

    pub fn insert(&self, handle: OpenHandle) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handles.write().insert(id, Arc::new(handle));
        id
    }

    pub fn get(&self, id: u64) -> Option<Arc<OpenHandle>> {
        self.handles.read().get(&id).cloned()
    }

    /// Removes the entry if present. Returns `true` if one was removed, so
    /// an in-flight `ReadAt` racing a `Close` on the same id can tell
    /// whether it's holding the last reference.
    pub fn remove(&self, id: u64) -> Option<Arc<OpenHandle>> {
        self.handles.write().remove(&id)
    }

    pub fn require(&self, id: u64) -> Result<Arc<OpenHandle>, CoreError> {
        self.get(id).ok_or_else(|| CoreError::new(d2d_core::ErrorKind::Invalid, "unknown handle id"))
    }

    /// Drains every entry, dropping each `File` and releasing its OS handle.
    /// Called on server shutdown (§4.9.1).
    pub fn clear(&self) {
        self.handles.write().clear();
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
