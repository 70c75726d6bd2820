// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter for session reconnection (§4.3).

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Delay before reconnect attempt number `attempt` (0-indexed), full
    /// jitter: a value drawn uniformly from `[0, base)` where `base` grows
    /// exponentially and is capped at `max`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_secs = self.initial.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let base = Duration::from_secs_f64(base_secs.min(self.max.as_secs_f64()));
        let jittered_secs = rand::thread_rng().gen_range(0.0..=base.as_secs_f64().max(0.001));
        Duration::from_secs_f64(jittered_secs)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
