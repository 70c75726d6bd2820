// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! d2d-mount: the server-side FUSE adapter (§4.10/§4.11) that exposes a
//! remote AgentFS surface as a read-only local filesystem.
//!
//! [`client::AgentFsClient`] is the RPC boundary, [`inodes::InodeTable`]
//! bridges FUSE's inode space to AgentFS paths, [`filesystem::D2dFuseFs`]
//! implements `fuser::Filesystem`, and [`counters::ProgressCounters`] tracks
//! the optional progress metrics.

pub mod client;
pub mod counters;
pub mod filesystem;
pub mod inodes;

pub use client::{
    AgentFsClient, FakeAgentFsClient, RemoteAttr, RemoteDirEntry, RemoteStatFs, TransportFsClient,
};
pub use counters::ProgressCounters;
pub use filesystem::D2dFuseFs;
pub use inodes::{InodeTable, ROOT_INODE};
