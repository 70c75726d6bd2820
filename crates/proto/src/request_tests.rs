// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct OpenFileParams {
    path: String,
}

#[test]
fn new_serialises_params_into_value() {
    let req = Request::new("OpenFile", OpenFileParams { path: "/a/b".into() });
    assert_eq!(req.method, "OpenFile");
    assert_eq!(req.params, serde_json::json!({"path": "/a/b"}));
}

#[test]
fn params_as_deserialises_back_into_typed_struct() {
    let req = Request::new("OpenFile", OpenFileParams { path: "/a/b".into() });
    let parsed: OpenFileParams = req.params_as().unwrap();
    assert_eq!(parsed, OpenFileParams { path: "/a/b".into() });
}

#[test]
fn missing_params_defaults_to_null() {
    let raw = r#"{"method": "Ping"}"#;
    let req: Request = serde_json::from_str(raw).unwrap();
    assert_eq!(req.params, serde_json::Value::Null);
}
