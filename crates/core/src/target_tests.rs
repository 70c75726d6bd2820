// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accepts_absolute_local_path() {
    assert!(Target::new("local1", "/srv/backups/data").is_ok());
}

#[test]
fn rejects_relative_local_path() {
    let err = Target::new("local1", "relative/path").unwrap_err();
    assert_eq!(err, InvalidTargetPath::RelativeLocalPath("relative/path".to_string()));
}

#[test]
fn accepts_well_formed_agent_path() {
    let t = Target::new("host1", "agent://10.0.0.5/C").unwrap();
    assert!(t.is_agent());
    let parsed = t.agent_path().unwrap();
    assert_eq!(parsed.host, "10.0.0.5");
    assert_eq!(parsed.drive, 'C');
}

#[test]
fn rejects_agent_path_missing_drive() {
    assert!(Target::new("host1", "agent://10.0.0.5/").is_err());
}

#[test]
fn rejects_agent_path_multi_char_drive() {
    assert!(Target::new("host1", "agent://10.0.0.5/CD").is_err());
}

#[test]
fn rejects_agent_path_missing_host() {
    assert!(Target::new("host1", "agent:///C").is_err());
}

#[test]
fn rejects_agent_path_without_slash() {
    assert!(Target::new("host1", "agent://10.0.0.5").is_err());
}
