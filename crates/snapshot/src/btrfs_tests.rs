// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn snapshot_path_is_nested_under_snapshot_root() {
    let handler = BtrfsHandler::new("/var/lib/d2d/snapshots");
    assert_eq!(handler.snapshot_path("job-1"), PathBuf::from("/var/lib/d2d/snapshots/job-1"));
}

#[test]
fn is_supported_requires_an_existing_source_path() {
    let handler = BtrfsHandler::new("/var/lib/d2d/snapshots");
    assert!(!handler.is_supported("/path/that/does/not/exist/hopefully"));
}
