// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_through_u16() {
    for status in [
        Status::Ok,
        Status::StreamFollows,
        Status::Invalid,
        Status::Permission,
        Status::NotExist,
        Status::Conflict,
        Status::Unsupported,
        Status::Timeout,
        Status::Internal,
    ] {
        assert_eq!(Status::from_u16(status.as_u16()), Some(status));
    }
}

#[test]
fn unknown_code_is_none() {
    assert_eq!(Status::from_u16(999), None);
}

#[test]
fn only_ok_and_stream_follows_are_success() {
    assert!(Status::Ok.is_success());
    assert!(Status::StreamFollows.is_success());
    assert!(!Status::NotExist.is_success());
}

#[test]
fn error_kind_mapping_matches_wire_convention() {
    assert_eq!(status_for_error_kind(ErrorKind::NotExist), Status::NotExist);
    assert_eq!(status_for_error_kind(ErrorKind::Permission), Status::Permission);
    assert_eq!(status_for_error_kind(ErrorKind::JobAlreadyRunning), Status::Conflict);
    assert_eq!(status_for_error_kind(ErrorKind::Transport), Status::Internal);
}
