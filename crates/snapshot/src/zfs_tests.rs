// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn is_supported_requires_an_existing_source_path() {
    let handler = ZfsHandler::new();
    assert!(!handler.is_supported("/path/that/does/not/exist/hopefully"));
}
