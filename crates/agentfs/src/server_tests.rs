// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn fixture() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("file.txt"), b"hello world").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/nested.txt"), b"nested").unwrap();
    dir
}

#[test]
fn open_file_rejects_write_flags() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let error = server.open_file("file.txt", O_WRONLY).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Permission);
}

#[test]
fn open_file_then_read_at_round_trips_bytes() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let handle_id = server.open_file("file.txt", 0).unwrap();
    let bytes = server.read_at(handle_id, 0, 5).unwrap();
    assert_eq!(bytes, b"hello");
}

#[test]
fn read_at_offset_past_end_is_empty() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let handle_id = server.open_file("file.txt", 0).unwrap();
    let bytes = server.read_at(handle_id, 1000, 5).unwrap();
    assert!(bytes.is_empty());
}

#[test]
fn read_at_clamps_length_to_remaining_size() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let handle_id = server.open_file("file.txt", 0).unwrap();
    let bytes = server.read_at(handle_id, 6, 1000).unwrap();
    assert_eq!(bytes, b"world");
}

#[test]
fn read_at_negative_length_is_invalid() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let handle_id = server.open_file("file.txt", 0).unwrap();
    let error = server.read_at(handle_id, 0, -1).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Invalid);
}

#[test]
fn close_then_read_at_is_invalid_handle() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let handle_id = server.open_file("file.txt", 0).unwrap();
    server.close(handle_id).unwrap();
    let error = server.read_at(handle_id, 0, 1).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Invalid);
}

#[test]
fn attr_reports_size_and_is_dir() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let file_attr = server.attr("file.txt").unwrap();
    assert_eq!(file_attr.size, 11);
    assert!(!file_attr.is_dir);

    let dir_attr = server.attr("sub").unwrap();
    assert!(dir_attr.is_dir);
    assert_eq!(dir_attr.blocks, 0);
}

#[test]
fn read_dir_lists_entries_without_dot_entries() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    let entries = server.read_dir(".").unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
    assert!(names.contains(&"file.txt".to_string()));
    assert!(names.contains(&"sub".to_string()));
    assert!(!names.iter().any(|n| n == "." || n == ".."));
}

#[test]
fn path_outside_root_surfaces_via_secure_join() {
    let dir = fixture();
    let server = AgentFsServer::new(dir.path());
    // secure_join clamps traversal to the root; the resulting path still
    // resolves (to the root itself), it never reads outside it.
    let result = server.attr("../../../../etc/passwd");
    assert!(result.is_err() || result.unwrap().name != "passwd");
}
