// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fuser::Filesystem` adapter (§4.11): bridges synchronous FUSE callbacks
//! onto the async [`AgentFsClient`], read-only throughout. Every mutating
//! callback replies `EROFS` without crossing the RPC boundary.

use crate::client::AgentFsClient;
use crate::counters::ProgressCounters;
use crate::inodes::InodeTable;
use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, ReplyStatfs, Request,
};
use libc::{EIO, ENOENT, EROFS};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;

const TTL: Duration = Duration::from_secs(1);

/// A read-only FUSE filesystem proxying every lookup to an [`AgentFsClient`]
/// over aRPC. One instance per mounted job (§4.10).
pub struct D2dFuseFs {
    client: Arc<dyn AgentFsClient>,
    runtime: Handle,
    inodes: InodeTable,
    counters: Arc<ProgressCounters>,
}

impl D2dFuseFs {
    pub fn new(client: Arc<dyn AgentFsClient>, runtime: Handle) -> Self {
        Self { client, runtime, inodes: InodeTable::new(), counters: Arc::new(ProgressCounters::new()) }
    }

    pub fn counters(&self) -> Arc<ProgressCounters> {
        self.counters.clone()
    }

    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    fn to_file_attr(ino: u64, attr: &crate::client::RemoteAttr) -> FileAttr {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(attr.mod_time_epoch_secs);
        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.blocks,
            atime: mtime,
            mtime,
            ctime: mtime,
            crtime: mtime,
            kind: if attr.is_dir { FileType::Directory } else { FileType::RegularFile },
            perm: (attr.mode & 0o7777) as u16,
            nlink: 1,
            uid: 0,
            gid: 0,
            rdev: 0,
            blksize: 4096,
            flags: 0,
        }
    }
}

impl Filesystem for D2dFuseFs {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(parent_path) = self.inodes.path_of(parent) else {
            reply.error(ENOENT);
            return;
        };
        let Some(name) = name.to_str() else {
            reply.error(ENOENT);
            return;
        };
        let path = InodeTable::join(&parent_path, name);
        match self.block_on(self.client.attr(&path)) {
            Ok(attr) => {
                let ino = self.inodes.intern(&path);
                reply.entry(&TTL, &Self::to_file_attr(ino, &attr), 0);
            }
            Err(_) => reply.error(ENOENT),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        let Some(path) = self.inodes.path_of(ino) else {
            reply.error(ENOENT);
            return;
        };
        match self.block_on(self.client.attr(&path)) {
            Ok(attr) => reply.attr(&TTL, &Self::to_file_attr(ino, &attr)),
            Err(_) => reply.error(ENOENT),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        let Some(path) = self.inodes.path_of(ino) else {
            reply.error(ENOENT);
            return;
        };
        match self.block_on(self.client.open_file(&path)) {
            Ok(handle_id) => {
                self.counters.record_file(&path);
                reply.opened(handle_id, 0);
            }
            Err(_) => reply.error(ENOENT),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        match self.block_on(self.client.read_at(fh, offset.max(0) as u64, size as i64)) {
            Ok(data) => {
                self.counters.record_read(data.len() as u64);
                reply.data(&data);
            }
            Err(_) => reply.error(EIO),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        let _ = self.block_on(self.client.close(fh));
        reply.ok();
    }

    fn readdir(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, offset: i64, mut reply: ReplyDirectory) {
        let Some(path) = self.inodes.path_of(ino) else {
            reply.error(ENOENT);
            return;
        };
        self.counters.record_folder(&path);
        let entries = match self.block_on(self.client.read_dir(&path)) {
            Ok(entries) => entries,
            Err(_) => {
                reply.error(ENOENT);
                return;
            }
        };

        let mut rows = vec![(ino, FileType::Directory, ".".to_string()), (ino, FileType::Directory, "..".to_string())];
        for entry in &entries {
            let child_path = InodeTable::join(&path, &entry.name);
            let child_ino = self.inodes.intern(&child_path);
            let kind = if entry.mode & 0o40000 != 0 { FileType::Directory } else { FileType::RegularFile };
            rows.push((child_ino, kind, entry.name.clone()));
        }

        for (index, (child_ino, kind, name)) in rows.into_iter().enumerate().skip(offset as usize) {
            if reply.add(child_ino, (index + 1) as i64, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        match self.block_on(self.client.statfs()) {
            Ok(info) => reply.statfs(
                info.blocks,
                info.bfree,
                info.bavail,
                info.files,
                info.ffree,
                info.bsize as u32,
                info.name_len as u32,
                info.bsize as u32,
            ),
            Err(_) => reply.error(EIO),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyWrite,
    ) {
        reply.error(EROFS);
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(EROFS);
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: fuser::ReplyCreate,
    ) {
        reply.error(EROFS);
    }

    fn unlink(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(EROFS);
    }

    fn rmdir(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(EROFS);
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(EROFS);
    }
}

#[cfg(test)]
#[path = "filesystem_tests.rs"]
mod tests;
