// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! d2d-orchestrator: the backup orchestrator state machine (§4.12) and
//! task discovery (§4.13).
//!
//! [`orchestrator::Orchestrator`] drives one [`state::JobState`] run at a
//! time per job id, delegating the agent-side snapshot/mount steps to the
//! [`orchestrator::AgentSession`]/[`orchestrator::MountHandle`] trait
//! boundaries `d2d-agent`/`d2d-server` implement. [`watcher`] and [`upid`]
//! implement C13's task discovery.

pub mod error;
pub mod filelock;
pub mod orchestrator;
pub mod process;
pub mod state;
pub mod upid;
pub mod watcher;

pub use error::OrchestratorError;
pub use filelock::{FileLock, FileLockGuard};
pub use orchestrator::{AgentSession, JobOutcome, JobRun, MountHandle, Orchestrator};
pub use state::JobState;
pub use upid::{parse_upid, search_key, Upid, UpidError};
pub use watcher::{discover_task, TASK_DISCOVERY_DEADLINE};
