// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dials the coordinator, authenticates with mTLS, performs the §6.1
//! upgrade handshake, and hands the resulting connection to the stream
//! multiplexer.

use d2d_creds::CredentialStore;
use d2d_transport::{client_config, drive, send_upgrade_request, Mux, MuxError, Router, TlsSetupError};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::info;
use yamux::{Control, Mode};

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("tls setup: {0}")]
    Tls(#[from] TlsSetupError),
    #[error("invalid server host: {0}")]
    ServerName(#[from] tokio_rustls::rustls::pki_types::InvalidDnsNameError),
    #[error("connecting to {addr}: {source}")]
    Io { addr: String, #[source] source: std::io::Error },
    #[error("upgrade handshake: {0}")]
    Upgrade(#[from] d2d_transport::UpgradeError),
}

/// A live connection to the coordinator: `control` opens outbound streams
/// (unused by the agent today, but symmetric with the server side);
/// `serve` drives inbound ones against `router` until the connection drops.
pub struct Connection {
    pub control: Control,
    driver: tokio::task::JoinHandle<Result<(), MuxError>>,
}

impl Connection {
    pub async fn join(self) -> Result<(), MuxError> {
        self.driver.await.unwrap_or(Ok(()))
    }
}

/// Dial `addr` (host:port), authenticate with `creds`, complete the upgrade
/// handshake as `hostname`, and start serving `router` over the resulting
/// multiplexed connection.
pub async fn connect(
    addr: &str,
    host: &str,
    hostname: &str,
    creds: &CredentialStore,
    router: Arc<Router>,
) -> Result<Connection, ConnectError> {
    let tls_config = client_config(&creds.cert_pem, &creds.key_pair_pem, &creds.ca_pem)?;
    let connector = TlsConnector::from(Arc::new(tls_config));

    let tcp = TcpStream::connect(addr).await.map_err(|source| ConnectError::Io { addr: addr.to_string(), source })?;
    let server_name = ServerName::try_from(host.to_string())?;
    let mut tls = connector.connect(server_name, tcp).await.map_err(|source| ConnectError::Io {
        addr: addr.to_string(),
        source,
    })?;

    send_upgrade_request(&mut tls, hostname, env!("CARGO_PKG_VERSION")).await?;
    info!(%addr, %hostname, "upgrade handshake complete, starting multiplexer");

    let mux = Mux::new(tls.compat(), Mode::Client);
    let control = mux.control.clone();
    let driver = tokio::spawn(drive(mux.connection, move |stream| {
        let router = router.clone();
        async move { router.serve_stream(d2d_transport::compat_stream(stream)).await }
    }));

    Ok(Connection { control, driver })
}
