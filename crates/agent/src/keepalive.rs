// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic keep-alive (§4.1, version-2 framing requirement carried into
//! SPEC_FULL §2): a production agent cannot rely on TCP keepalive alone
//! across NAT/firewalled links, so it opens a zero-length control stream on
//! the muxed session on an interval. The stream carries no payload; its
//! only purpose is to force yamux (and the underlying TCP stack) to notice
//! a severed connection well before an idle timeout would. Opportunistic
//! drive-metadata refresh (`Target.drive_meta`, §3) piggybacks on the same
//! tick so the coordinator's view of free space stays current without a
//! separate poll loop.

use d2d_agentfs::AgentFsServer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use yamux::Control;

pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Drives the keep-alive loop until the multiplexer's control handle starts
/// failing to open streams, which signals the connection is gone.
pub async fn run_keepalive(mut control: Control, drive_probe: Option<Arc<AgentFsServer>>) {
    let mut interval = tokio::time::interval(KEEPALIVE_INTERVAL);
    loop {
        interval.tick().await;
        match control.open_stream().await {
            Ok(stream) => drop(stream),
            Err(error) => {
                warn!(%error, "keepalive failed to open stream, connection likely dead");
                return;
            }
        }

        if let Some(server) = &drive_probe {
            let statfs = server.statfs();
            info!(bfree = statfs.bfree, "drive metadata refreshed");
        }
    }
}

#[cfg(test)]
#[path = "keepalive_tests.rs"]
mod tests;
