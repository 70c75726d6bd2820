// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-id parsing for task discovery (§4.12, C13).
//!
//! The backup utility writes one file per task into its task-log directory,
//! named so it contains a hex-escaped search key identifying this job's run.
//! The filename itself is a colon-delimited UPID the orchestrator parses to
//! learn the task id and start time.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpidError {
    #[error("not a UPID: {0:?}")]
    Malformed(String),
    #[error("UPID field {0:?} is not valid hex: {1:?}")]
    InvalidHex(&'static str, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upid {
    pub node: String,
    pub pid: u32,
    pub pstart: u64,
    pub task_id: u64,
    pub start_time_epoch_secs: u64,
    pub worker_type: String,
    pub worker_id: String,
    pub auth_id: String,
}

/// Builds the search key the orchestrator looks for in a task-log filename:
/// `:backup:<store>:host-<backupId>`, with every non-alphanumeric byte
/// hex-escaped as `\xNN`.
pub fn search_key(datastore: &str, backup_id: &str) -> String {
    let raw = format!(":backup:{datastore}:host-{backup_id}");
    hex_escape(&raw)
}

fn hex_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char);
        } else {
            out.push_str(&format!("\\x{byte:02X}"));
        }
    }
    out
}

/// Parses a filename of the form
/// `UPID:<node>:<pid-hex>:<pstart-hex>:<taskid-hex>:<starttime-hex>:<wtype>:<wid>:<authid>:`.
pub fn parse_upid(raw: &str) -> Result<Upid, UpidError> {
    let mut fields = raw.split(':');
    let tag = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?;
    if tag != "UPID" {
        return Err(UpidError::Malformed(raw.to_string()));
    }

    let node = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?.to_string();
    let pid_hex = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?;
    let pstart_hex = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?;
    let taskid_hex = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?;
    let starttime_hex = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?;
    let worker_type = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?.to_string();
    let worker_id = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?.to_string();
    let auth_id = fields.next().ok_or_else(|| UpidError::Malformed(raw.to_string()))?.to_string();

    let trailer = fields.next();
    if trailer != Some("") || fields.next().is_some() {
        return Err(UpidError::Malformed(raw.to_string()));
    }

    let pid = u32::from_str_radix(pid_hex, 16)
        .map_err(|_| UpidError::InvalidHex("pid", pid_hex.to_string()))?;
    let pstart = u64::from_str_radix(pstart_hex, 16)
        .map_err(|_| UpidError::InvalidHex("pstart", pstart_hex.to_string()))?;
    let task_id = u64::from_str_radix(taskid_hex, 16)
        .map_err(|_| UpidError::InvalidHex("taskid", taskid_hex.to_string()))?;
    let start_time_epoch_secs = u64::from_str_radix(starttime_hex, 16)
        .map_err(|_| UpidError::InvalidHex("starttime", starttime_hex.to_string()))?;

    Ok(Upid { node, pid, pstart, task_id, start_time_epoch_secs, worker_type, worker_id, auth_id })
}

#[cfg(test)]
#[path = "upid_tests.rs"]
mod tests;
