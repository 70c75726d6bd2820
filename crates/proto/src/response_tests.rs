// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use d2d_core::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Attr {
    size: u64,
}

#[test]
fn ok_response_is_success_and_round_trips_body() {
    let resp = Response::ok(Attr { size: 42 });
    assert!(resp.is_success());
    assert_eq!(resp.status, 200);
    let attr: Attr = resp.into_result().unwrap();
    assert_eq!(attr, Attr { size: 42 });
}

#[test]
fn stream_follows_response_is_success() {
    let resp = Response::stream_follows(serde_json::json!({"len": 1024}));
    assert!(resp.is_success());
    assert_eq!(resp.status, 213);
}

#[test]
fn error_response_maps_kind_to_status_and_round_trips_error() {
    let err = CoreError::not_exist("/missing");
    let resp = Response::error(&err);
    assert_eq!(resp.status, 404);
    assert!(!resp.is_success());
    let result: Result<Attr, CoreError> = resp.into_result();
    let got = result.unwrap_err();
    assert_eq!(got.kind(), ErrorKind::NotExist);
    assert_eq!(got.path.as_deref(), Some("/missing"));
}

#[test]
fn unknown_status_code_is_treated_as_failure() {
    let resp = Response { status: 999, body: serde_json::Value::Null };
    assert!(!resp.is_success());
}
