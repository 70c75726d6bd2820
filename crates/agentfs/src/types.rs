// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-shaped result types for the AgentFS handlers (§4.9).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekFrom {
    Start,
    Current,
    End,
    Data,
    Hole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFileResult {
    #[serde(rename = "handleId")]
    pub handle_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub size: u64,
    pub mode: u32,
    pub mod_time_epoch_secs: u64,
    pub is_dir: bool,
    pub blocks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Xattr {
    pub creation_time_epoch_secs: u64,
    pub last_access_time_epoch_secs: u64,
    pub last_write_time_epoch_secs: u64,
    pub attribute_flags: HashMap<String, bool>,
    pub owner: String,
    pub group: String,
    pub acl: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub mode: u32,
    pub size: u64,
    pub mod_time_epoch_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatFsInfo {
    pub bsize: u64,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub name_len: u64,
}
