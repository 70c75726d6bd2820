// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-specific sparse seek (§4.9.7) and `statfs` (§4.9.8) backends.

use crate::types::{SeekFrom, StatFsInfo};
use d2d_core::{CoreError, ErrorKind};
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;

fn whence_to_libc(whence: SeekFrom) -> libc::c_int {
    match whence {
        SeekFrom::Start => libc::SEEK_SET,
        SeekFrom::Current => libc::SEEK_CUR,
        SeekFrom::End => libc::SEEK_END,
        SeekFrom::Data => libc::SEEK_DATA,
        SeekFrom::Hole => libc::SEEK_HOLE,
    }
}

/// `lseek(2)` wrapper. `ENXIO` from `SEEK_DATA` past the last data range is
/// surfaced as [`ErrorKind::Invalid`]; `EINVAL`/`EOPNOTSUPP` on a sparse
/// whence is treated as "no sparseness" — the whole file is one data range
/// (§4.9.7).
pub fn lseek(file: &File, offset: i64, whence: SeekFrom, file_size: u64) -> Result<i64, CoreError> {
    let result = unsafe { libc::lseek(file.as_raw_fd(), offset, whence_to_libc(whence)) };
    if result >= 0 {
        return Ok(result);
    }

    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    match whence {
        SeekFrom::Data | SeekFrom::Hole if errno == libc::EINVAL || errno == libc::EOPNOTSUPP => {
            // No sparseness support: SEEK_DATA always finds the whole file
            // starting at `offset`; SEEK_HOLE has nothing before EOF.
            match whence {
                SeekFrom::Data if offset as u64 <= file_size => Ok(offset),
                SeekFrom::Hole => Ok(file_size as i64),
                _ => Err(CoreError::new(ErrorKind::Invalid, "no such device or address")),
            }
        }
        SeekFrom::Data if errno == libc::ENXIO => {
            Err(CoreError::new(ErrorKind::Invalid, "no data found at or after offset"))
        }
        _ => Err(CoreError::new(ErrorKind::Invalid, std::io::Error::from_raw_os_error(errno).to_string())),
    }
}

pub fn statfs(root: &Path) -> Option<StatFsInfo> {
    let c_path = std::ffi::CString::new(root.to_string_lossy().as_bytes()).ok()?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if result != 0 {
        return None;
    }
    Some(StatFsInfo {
        bsize: stat.f_bsize as u64,
        blocks: stat.f_blocks as u64,
        bfree: stat.f_bfree as u64,
        bavail: stat.f_bavail as u64,
        files: stat.f_files as u64,
        ffree: stat.f_ffree as u64,
        name_len: stat.f_namemax as u64,
    })
}

#[cfg(test)]
#[path = "sparse_tests.rs"]
mod tests;
