// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::NamedTempFile;

#[test]
fn seek_end_reports_file_size() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"hello world").unwrap();
    let reopened = file.reopen().unwrap();
    let pos = lseek(&reopened, 0, SeekFrom::End, 11).unwrap();
    assert_eq!(pos, 11);
}

#[test]
fn seek_set_moves_to_offset() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"hello world").unwrap();
    let reopened = file.reopen().unwrap();
    let pos = lseek(&reopened, 4, SeekFrom::Start, 11).unwrap();
    assert_eq!(pos, 4);
}

#[test]
fn statfs_on_tmp_dir_reports_nonzero_block_size() {
    let dir = tempfile::tempdir().unwrap();
    let info = statfs(dir.path()).unwrap();
    assert!(info.bsize > 0);
}
