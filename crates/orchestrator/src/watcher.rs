// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task discovery (§4.12/§4.13, C13): watch the backup utility's task-log
//! directory for a file naming this job's search key, and parse its UPID.

use crate::upid::{parse_upid, search_key, Upid};
use notify::{RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// §4.12: "If no match arrives before the 20-second deadline the
/// orchestrator kills the utility and reports 'no task created'."
pub const TASK_DISCOVERY_DEADLINE: Duration = Duration::from_secs(20);

/// Watches `task_log_dir` for a file containing `datastore`/`backup_id`'s
/// search key (and not a `.tmp_` partial write), returning its parsed UPID.
/// Resolves as soon as a match appears, or `None` if `deadline` elapses.
pub async fn discover_task(
    task_log_dir: &Path,
    datastore: &str,
    backup_id: &str,
    deadline: Duration,
) -> Option<Upid> {
    let key = search_key(datastore, backup_id);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = match notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(event) = event {
            let _ = tx.send(event);
        }
    }) {
        Ok(watcher) => watcher,
        Err(error) => {
            warn!(%error, "failed to create task-log watcher");
            return None;
        }
    };

    if let Err(error) = watcher.watch(task_log_dir, RecursiveMode::Recursive) {
        warn!(%error, path = %task_log_dir.display(), "failed to watch task-log directory");
        return None;
    }

    // A file may already exist by the time the watcher is armed.
    if let Some(upid) = scan_existing(task_log_dir, &key) {
        return Some(upid);
    }

    let result = tokio::time::timeout(deadline, async {
        while let Some(event) = rx.recv().await {
            if let Some(upid) = match_event(&event, &key) {
                return Some(upid);
            }
        }
        None
    })
    .await;

    match result {
        Ok(found) => found,
        Err(_elapsed) => {
            debug!(%key, "task discovery deadline elapsed with no match");
            None
        }
    }
}

fn scan_existing(dir: &Path, key: &str) -> Option<Upid> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        if let Some(upid) = match_filename(&entry.file_name().to_string_lossy(), key) {
            return Some(upid);
        }
    }
    None
}

fn match_event(event: &notify::Event, key: &str) -> Option<Upid> {
    if !matches!(event.kind, notify::EventKind::Create(_)) {
        return None;
    }
    event.paths.iter().find_map(|path| {
        let name = path.file_name()?.to_string_lossy();
        match_filename(&name, key)
    })
}

fn match_filename(name: &str, key: &str) -> Option<Upid> {
    if !name.contains(key) || name.contains(".tmp_") {
        return None;
    }
    parse_upid(name).ok()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
