// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AgentFS server (§4.9): the in-process implementation of `OpenFile`,
//! `Attr`, `Xattr`, `ReadDir`, `ReadAt`, `Lseek`, `Close`, `StatFS` against
//! one snapshot root. `d2d-agent` registers these as `Router` methods under
//! a `<jobId>/` prefix.

use crate::handle::{HandleTable, OpenHandle};
use crate::path_safety::secure_join;
use crate::types::{Attr, DirEntry, SeekFrom, StatFsInfo, Xattr};
use d2d_core::{CoreError, ErrorKind};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Any of these bits in `OpenFile`'s `flag` is rejected with a permission
/// error (§4.9.3): this surface is read-only.
const O_WRONLY: u32 = 0o1;
const O_RDWR: u32 = 0o2;
const O_APPEND: u32 = 0o2000;
const O_CREAT: u32 = 0o100;
const O_TRUNC: u32 = 0o1000;
const WRITE_FLAGS: u32 = O_WRONLY | O_RDWR | O_APPEND | O_CREAT | O_TRUNC;

fn epoch_secs(time: std::io::Result<SystemTime>) -> u64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct AgentFsServer {
    root: PathBuf,
    handles: HandleTable,
    statfs: StatFsInfo,
}

impl AgentFsServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let statfs = compute_statfs(&root);
        Self { root, handles: HandleTable::new(), statfs }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, CoreError> {
        secure_join(&self.root, path)
    }

    /// §4.9.3: rejects any write-capable flag, otherwise opens read-only.
    pub fn open_file(&self, path: &str, flag: u32) -> Result<u64, CoreError> {
        if flag & WRITE_FLAGS != 0 {
            return Err(CoreError::new(ErrorKind::Permission, "write operations not allowed")
                .with_op("OpenFile")
                .with_path(path));
        }
        let resolved = self.resolve(path)?;
        let metadata = std::fs::metadata(&resolved)
            .map_err(|_| CoreError::not_exist(path.to_string()))?;
        let file = File::open(&resolved).map_err(|_| CoreError::not_exist(path.to_string()))?;
        let handle = OpenHandle {
            file,
            path: resolved,
            size: metadata.len(),
            is_dir: metadata.is_dir(),
        };
        Ok(self.handles.insert(handle))
    }

    pub fn attr(&self, path: &str) -> Result<Attr, CoreError> {
        let resolved = self.resolve(path)?;
        let metadata =
            std::fs::symlink_metadata(&resolved).map_err(|_| CoreError::not_exist(path.to_string()))?;
        let block_size = if self.statfs.bsize == 0 { 4096 } else { self.statfs.bsize };
        let blocks = if metadata.is_dir() {
            0
        } else {
            metadata.len().div_ceil(block_size)
        };
        Ok(Attr {
            name: resolved
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: metadata.len(),
            mode: unix_mode(&metadata),
            mod_time_epoch_secs: epoch_secs(metadata.modified()),
            is_dir: metadata.is_dir(),
            blocks,
        })
    }

    pub fn xattr(&self, path: &str) -> Result<Xattr, CoreError> {
        let resolved = self.resolve(path)?;
        let metadata =
            std::fs::symlink_metadata(&resolved).map_err(|_| CoreError::not_exist(path.to_string()))?;
        Ok(Xattr {
            creation_time_epoch_secs: epoch_secs(metadata.created()),
            last_access_time_epoch_secs: epoch_secs(metadata.accessed()),
            last_write_time_epoch_secs: epoch_secs(metadata.modified()),
            attribute_flags: unix_attribute_flags(&metadata),
            owner: unix_owner(&metadata),
            group: unix_group(&metadata),
            acl: Vec::new(),
        })
    }

    /// §4.9.5: bulk directory listing. Temporary/reparse-like entries and
    /// `.`/`..` are never produced by `std::fs::read_dir`, so no extra
    /// filtering is needed on this backend.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, CoreError> {
        let resolved = self.resolve(path)?;
        let entries =
            std::fs::read_dir(&resolved).map_err(|_| CoreError::not_exist(path.to_string()))?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::new(ErrorKind::Invalid, e.to_string()))?;
            let metadata = entry.metadata().map_err(|e| CoreError::new(ErrorKind::Invalid, e.to_string()))?;
            out.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                mode: unix_mode(&metadata),
                size: metadata.len(),
                mod_time_epoch_secs: epoch_secs(metadata.modified()),
            });
        }
        Ok(out)
    }

    /// §4.9.6: clamps the requested range to the file's size and returns
    /// the bytes, mapping the file with `memmap2` when non-empty.
    pub fn read_at(&self, handle_id: u64, offset: u64, length: i64) -> Result<Vec<u8>, CoreError> {
        if length < 0 {
            return Err(CoreError::new(ErrorKind::Invalid, "length must not be negative"));
        }
        let handle = self.handles.require(handle_id)?;
        if offset >= handle.size {
            return Ok(Vec::new());
        }
        let length = length as u64;
        let remaining = handle.size - offset;
        let length = length.min(remaining);
        if length == 0 {
            return Ok(Vec::new());
        }

        let map = unsafe { memmap2::Mmap::map(&handle.file) }
            .map_err(|e| CoreError::new(ErrorKind::Invalid, e.to_string()))?;
        let start = offset as usize;
        let end = start + length as usize;
        Ok(map.get(start..end).map(|s| s.to_vec()).unwrap_or_default())
    }

    /// §4.9.7: `SEEK_SET`/`SEEK_CUR`/`SEEK_END` plus sparse `SEEK_DATA`/
    /// `SEEK_HOLE`, backed by `lseek(2)` on unix. A platform that doesn't
    /// support sparse seeking reports the whole file as one data range.
    pub fn lseek(&self, handle_id: u64, offset: i64, whence: SeekFrom) -> Result<i64, CoreError> {
        let handle = self.handles.require(handle_id)?;
        #[cfg(unix)]
        {
            crate::sparse::lseek(&handle.file, offset, whence, handle.size)
        }
        #[cfg(not(unix))]
        {
            let _ = (offset, whence);
            Ok(handle.size as i64)
        }
    }

    pub fn close(&self, handle_id: u64) -> Result<(), CoreError> {
        self.handles.remove(handle_id);
        Ok(())
    }

    pub fn statfs(&self) -> StatFsInfo {
        self.statfs
    }

    pub fn shutdown(&self) {
        info!(open_handles = self.handles.len(), "shutting down AgentFS server");
        self.handles.clear();
    }
}

#[cfg(unix)]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

#[cfg(unix)]
fn unix_owner(metadata: &std::fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.uid().to_string()
}

#[cfg(not(unix))]
fn unix_owner(_metadata: &std::fs::Metadata) -> String {
    String::new()
}

#[cfg(unix)]
fn unix_group(metadata: &std::fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.gid().to_string()
}

#[cfg(not(unix))]
fn unix_group(_metadata: &std::fs::Metadata) -> String {
    String::new()
}

fn unix_attribute_flags(metadata: &std::fs::Metadata) -> HashMap<String, bool> {
    let mut flags = HashMap::new();
    flags.insert("readonly".to_string(), metadata.permissions().readonly());
    flags
}

fn compute_statfs(root: &Path) -> StatFsInfo {
    #[cfg(unix)]
    {
        crate::sparse::statfs(root).unwrap_or(StatFsInfo {
            bsize: 4096,
            blocks: 0,
            bfree: 0,
            bavail: 0,
            files: 0,
            ffree: 0,
            name_len: 255,
        })
    }
    #[cfg(not(unix))]
    {
        let _ = root;
        StatFsInfo { bsize: 4096, blocks: 0, bfree: 0, bavail: 0, files: 0, ffree: 0, name_len: 255 }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
