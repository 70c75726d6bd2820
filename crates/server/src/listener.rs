// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS accept loop (§6.1/§6.2): accepts a TCP connection, completes mTLS,
//! reads the plaintext upgrade request to learn the agent's hostname,
//! starts the multiplexer, and registers the resulting session with the
//! [`SessionManager`]. Any job ids a replaced or dropped session had
//! mounted are torn down through the supplied [`MountHandle`].
//!
//! Grounded in the accept-loop shape of a classic listener task: accept in
//! a loop, hand each connection to a spawned task, keep going on a single
//! connection's failure.

use crate::session_manager::SessionManager;
use d2d_orchestrator::MountHandle;
use d2d_transport::{
    compat_stream, drive, read_upgrade_request, server_config, write_upgrade_response, Mux, Router, TlsSetupError,
    UpgradeError,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use yamux::Mode;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("tls setup: {0}")]
    Tls(#[from] TlsSetupError),
    #[error("binding {addr}: {source}")]
    Bind { addr: String, #[source] source: std::io::Error },
}

#[derive(Debug, Error)]
enum AcceptError {
    #[error("accepting connection: {0}")]
    Accept(#[from] std::io::Error),
    #[error("tls handshake: {0}")]
    Handshake(std::io::Error),
    #[error("upgrade handshake: {0}")]
    Upgrade(#[from] UpgradeError),
}

/// Runs the accept loop until `shutdown` is cancelled. The server doesn't
/// serve any inbound RPC methods to the agent (`ping`/`backup`/`cleanup`
/// are server-initiated), so the router handed to `drive` has no
/// registered handlers.
pub async fn run_listener(
    addr: &str,
    cert_pem: &str,
    key_pem: &str,
    ca_pem: &str,
    sessions: SessionManager,
    mount: Arc<dyn MountHandle>,
    shutdown: CancellationToken,
) -> Result<(), ListenerError> {
    let tls_config = server_config(cert_pem, key_pem, ca_pem)?;
    let acceptor = TlsAcceptor::from(Arc::new(tls_config));
    let listener =
        TcpListener::bind(addr).await.map_err(|source| ListenerError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, "listening for agent connections");

    loop {
        let (tcp, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(error) => {
                    warn!(%error, "accept failed");
                    continue;
                }
            },
            _ = shutdown.cancelled() => return Ok(()),
        };

        let acceptor = acceptor.clone();
        let sessions = sessions.clone();
        let mount = mount.clone();
        tokio::spawn(async move {
            if let Err(error) = handle_connection(tcp, peer, acceptor, sessions, mount).await {
                warn!(%peer, %error, "agent connection setup failed");
            }
        });
    }
}

async fn handle_connection(
    tcp: tokio::net::TcpStream,
    peer: SocketAddr,
    acceptor: TlsAcceptor,
    sessions: SessionManager,
    mount: Arc<dyn MountHandle>,
) -> Result<(), AcceptError> {
    let mut tls = acceptor.accept(tcp).await.map_err(AcceptError::Handshake)?;
    let upgrade = read_upgrade_request(&mut tls).await?;
    write_upgrade_response(&mut tls).await?;
    let hostname = upgrade.hostname.clone();
    info!(%peer, %hostname, version = %upgrade.version, "agent upgraded");

    let router = Router::builder().build();
    let mux = Mux::new(tls.compat(), Mode::Server);
    let session = d2d_transport::Session::new(mux.control.clone());

    let driver = {
        let hostname = hostname.clone();
        let sessions = sessions.clone();
        let mount = mount.clone();
        tokio::spawn(async move {
            let result = drive(mux.connection, move |stream| {
                let router = router.clone();
                async move { router.serve_stream(compat_stream(stream)).await }
            })
            .await;
            // Reached only on a genuine disconnect, never on the abort the
            // replace-path below issues against a superseded driver.
            unmount_orphans(&mount, sessions.remove(&hostname)).await;
            result
        })
    };

    let (_managed, orphaned) = sessions.register(&hostname, session, driver);
    unmount_orphans(&mount, orphaned).await;
    Ok(())
}

async fn unmount_orphans(mount: &Arc<dyn MountHandle>, job_ids: Vec<String>) {
    for job_id in job_ids {
        if let Err(error) = mount.unmount(&job_id).await {
            warn!(job_id, %error, "unmount failed while retiring session");
        }
    }
}
