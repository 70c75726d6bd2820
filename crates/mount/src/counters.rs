// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.11: "Optional counters track unique files/folders accessed and bytes
//! read, sampled for a simple instantaneous-speed estimate." Kept as a
//! free-standing struct so the FUSE adapter can snapshot it for logging
//! without taking a lock on the hot read path.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct ProgressCounters {
    bytes_read: AtomicU64,
    seen: Mutex<HashSet<String>>,
    files: AtomicU64,
    folders: AtomicU64,
    sample: Mutex<Sample>,
}

struct Sample {
    at: Instant,
    bytes_read: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub files: u64,
    pub folders: u64,
    pub bytes_read: u64,
    pub bytes_per_sec: f64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self {
            bytes_read: AtomicU64::new(0),
            seen: Mutex::new(HashSet::new()),
            files: AtomicU64::new(0),
            folders: AtomicU64::new(0),
            sample: Mutex::new(Sample { at: Instant::now(), bytes_read: 0 }),
        }
    }

    pub fn record_file(&self, path: &str) {
        if self.seen.lock().insert(path.to_string()) {
            self.files.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_folder(&self, path: &str) {
        if self.seen.lock().insert(path.to_string()) {
            self.folders.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Computes instantaneous throughput since the last call to `snapshot`.
    pub fn snapshot(&self) -> Snapshot {
        let bytes_read = self.bytes_read.load(Ordering::Relaxed);
        let mut sample = self.sample.lock();
        let elapsed = sample.at.elapsed();
        let delta = bytes_read.saturating_sub(sample.bytes_read);
        let bytes_per_sec = if elapsed > Duration::ZERO {
            delta as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        sample.at = Instant::now();
        sample.bytes_read = bytes_read;
        Snapshot {
            files: self.files.load(Ordering::Relaxed),
            folders: self.folders.load(Ordering::Relaxed),
            bytes_read,
            bytes_per_sec,
        }
    }
}

impl Default for ProgressCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_file_only_counted_once() {
        let counters = ProgressCounters::new();
        counters.record_file("a.txt");
        counters.record_file("a.txt");
        counters.record_file("b.txt");
        assert_eq!(counters.snapshot().files, 2);
    }

    #[test]
    fn folders_tracked_independently_of_files() {
        let counters = ProgressCounters::new();
        counters.record_folder("sub");
        counters.record_file("sub/a.txt");
        let snapshot = counters.snapshot();
        assert_eq!(snapshot.folders, 1);
        assert_eq!(snapshot.files, 1);
    }

    #[test]
    fn bytes_read_accumulates() {
        let counters = ProgressCounters::new();
        counters.record_read(100);
        counters.record_read(50);
        assert_eq!(counters.snapshot().bytes_read, 150);
    }
}
