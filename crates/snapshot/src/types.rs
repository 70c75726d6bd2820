// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot record shared by the host (§4.7) and source-side (§4.8)
//! managers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Path the caller should read from — the shadow copy device path or
    /// the snapshot-mount root, depending on the handler.
    pub path: String,
    pub source_path: String,
    pub id: String,
    pub time_started_epoch_ms: u64,
}
