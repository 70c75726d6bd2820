// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn registry_key_is_stable_per_job() {
    assert_eq!(SnapshotRecord::registry_key("web01"), "d2d-snapshot-web01");
    assert_eq!(SnapshotRecord::registry_key("web01"), SnapshotRecord::registry_key("web01"));
}

#[test]
fn record_round_trips_through_json() {
    let rec = SnapshotRecord {
        path: "/var/run/d2d/snap-1".into(),
        source_path: "/srv/data".into(),
        id: SnapshotId::new("snap-1"),
        time_started_epoch_ms: 1_700_000_000_000,
        direct: false,
        handler_kind: HandlerKind::Btrfs,
    };
    let json = serde_json::to_string(&rec).unwrap();
    let back: SnapshotRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rec);
}
