// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! d2d-agent: the agent binary's library half (§4.1, §4.7-§4.9).
//!
//! [`jobs::JobRegistry`] owns one [`d2d_agentfs::AgentFsServer`] per active
//! job, created and torn down by the bare `backup`/`cleanup` methods (§6.2).
//! [`handlers`] wires the registry, plus `ping`, into a
//! [`d2d_transport::Router`] — the agent is the RPC-serving role on the
//! muxed session. [`connect`] dials the coordinator, performs the upgrade
//! handshake, and hands the resulting connection to the multiplexer.
//! [`keepalive`] drives the periodic zero-length control stream §2 of the
//! expanded spec asks for.

pub mod connect;
pub mod handlers;
pub mod jobs;
pub mod keepalive;

pub use connect::{connect, ConnectError};
pub use handlers::build_router;
pub use jobs::{JobRegistry, RegisteredJob};
pub use keepalive::run_keepalive;
