// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit breaker guarding calls on a session (§4.3): once consecutive
//! failures cross `failure_threshold`, calls are rejected locally with
//! `ErrorKind::CircuitOpen` until `cooldown` has elapsed, at which point a
//! single probe call is allowed through (half-open) to decide whether to
//! close the circuit again or re-open it.

use d2d_core::Clock;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at_ms: u64,
}

pub struct CircuitBreaker<C: Clock> {
    clock: C,
    failure_threshold: u32,
    cooldown: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(clock: C, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            clock,
            failure_threshold,
            cooldown,
            inner: Arc::new(Mutex::new(Inner {
                state: State::Closed,
                consecutive_failures: 0,
                opened_at_ms: 0,
            })),
        }
    }

    /// Whether a call is currently allowed through. Transitions Open ->
    /// HalfOpen once the cooldown has elapsed, admitting exactly one probe.
    pub fn allow_call(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            State::Closed => true,
            State::HalfOpen => false,
            State::Open => {
                let elapsed = self.clock.epoch_ms().saturating_sub(inner.opened_at_ms);
                if elapsed >= self.cooldown.as_millis() as u64 {
                    inner.state = State::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.opened_at_ms = self.clock.epoch_ms();
            }
            State::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = State::Open;
                    inner.opened_at_ms = self.clock.epoch_ms();
                }
            }
            State::Open => {}
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().state == State::Open
    }

    /// Force the circuit open directly, bypassing the failure-count
    /// threshold. Used when a higher-level process (session reconnection)
    /// has already exhausted its own retries and wants the breaker to
    /// reject calls for a full `cooldown` regardless of the consecutive
    /// failure count seen so far.
    pub fn force_open(&self) {
        let mut inner = self.inner.lock();
        inner.state = State::Open;
        inner.opened_at_ms = self.clock.epoch_ms();
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            failure_threshold: self.failure_threshold,
            cooldown: self.cooldown,
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
#[path = "circuit_tests.rs"]
mod tests;
