// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use d2d_core::CoreError;

/// Both snapshot managers surface [`CoreError`] directly: §7's error-kind
/// table names `SnapshotCreation`/`SnapshotTimeout`/`InvalidSnapshot`/
/// `Unsupported` as the kinds this crate produces, and `d2d-proto` already
/// knows how to serialise a `CoreError` onto the wire.
pub type SnapshotError = CoreError;
