// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn kind_round_trips_through_json() {
    let e = CoreError::not_exist("/root/missing.txt");
    let json = serde_json::to_string(&e).unwrap();
    let back: CoreError = serde_json::from_str(&json).unwrap();
    assert_eq!(back.kind(), ErrorKind::NotExist);
    assert_eq!(back.path.as_deref(), Some("/root/missing.txt"));
}

#[test]
fn wire_error_type_matches_os_error_convention() {
    assert_eq!(ErrorKind::NotExist.wire_error_type(), "os.ErrNotExist");
    assert_eq!(ErrorKind::Permission.wire_error_type(), "os.ErrPermission");
    assert_eq!(ErrorKind::Invalid.wire_error_type(), "os.PathError");
}

#[test]
fn callers_test_by_kind_not_message() {
    let e = CoreError::permission("OpenFile", "/secret");
    match e.kind() {
        ErrorKind::Permission => {}
        other => panic!("expected Permission, got {other:?}"),
    }
}

#[test]
fn display_includes_op_and_path_when_present() {
    let e = CoreError::permission("OpenFile", "/secret");
    let s = e.to_string();
    assert!(s.contains("OpenFile"));
    assert!(s.contains("/secret"));
}
