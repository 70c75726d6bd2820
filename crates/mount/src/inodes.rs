// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inode <-> path table for the FUSE adapter. FUSE identifies everything
//! by a 64-bit inode number; AgentFS identifies everything by a
//! `secure_join`-relative path string. This table is the bridge, built
//! lazily as `lookup`/`readdir` discover new paths.

use parking_lot::RwLock;
use std::collections::HashMap;

pub const ROOT_INODE: u64 = 1;

#[derive(Default)]
pub struct InodeTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    path_to_ino: HashMap<String, u64>,
    ino_to_path: HashMap<u64, String>,
    next_ino: u64,
}

impl InodeTable {
    pub fn new() -> Self {
        let mut inner = Inner { next_ino: ROOT_INODE + 1, ..Default::default() };
        inner.path_to_ino.insert(String::new(), ROOT_INODE);
        inner.ino_to_path.insert(ROOT_INODE, String::new());
        Self { inner: RwLock::new(inner) }
    }

    /// Returns the inode for `path`, allocating a fresh one if unseen.
    pub fn intern(&self, path: &str) -> u64 {
        if let Some(ino) = self.inner.read().path_to_ino.get(path).copied() {
            return ino;
        }
        let mut inner = self.inner.write();
        if let Some(ino) = inner.path_to_ino.get(path).copied() {
            return ino;
        }
        let ino = inner.next_ino;
        inner.next_ino += 1;
        inner.path_to_ino.insert(path.to_string(), ino);
        inner.ino_to_path.insert(ino, path.to_string());
        ino
    }

    pub fn path_of(&self, ino: u64) -> Option<String> {
        self.inner.read().ino_to_path.get(&ino).cloned()
    }

    pub fn join(parent: &str, name: &str) -> String {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{parent}/{name}")
        }
    }
}
