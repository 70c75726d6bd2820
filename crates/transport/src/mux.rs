// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream multiplexing over a single mutually-authenticated TLS connection
//! (§4.1). Both the agent and the server run a [`Router::serve`] loop on the
//! same [`yamux::Connection`] and either side may additionally open streams
//! outbound through a [`yamux::Control`] handle — the connection is
//! full-duplex regardless of which side dialed the underlying TLS socket.

use futures::io::{AsyncRead, AsyncWrite};
use futures::StreamExt;
use tokio_util::compat::{Compat, FuturesAsyncReadCompatExt};
use yamux::{Config, Connection, Control, Mode};

pub type MuxStream = yamux::Stream;

/// Adapt a yamux stream (futures-io) into one usable with tokio-io based
/// code such as `d2d-proto`'s framing and `Router::serve_stream`.
pub fn compat_stream(stream: MuxStream) -> Compat<MuxStream> {
    stream.compat()
}

#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    #[error("multiplexer connection closed")]
    Closed,
    #[error("yamux error: {0}")]
    Yamux(#[from] yamux::ConnectionError),
}

/// A running multiplexer: `control` opens outbound streams, `connection`
/// must be driven (see [`drive`]) to accept inbound ones and service opens.
pub struct Mux<T> {
    pub control: Control,
    pub connection: Connection<T>,
}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> Mux<T> {
    /// Build a multiplexer over `io`. The agent dials (`Mode::Client`); the
    /// server accepts (`Mode::Server`) (§6.1).
    pub fn new(io: T, mode: Mode) -> Self {
        let connection = Connection::new(io, Config::default(), mode);
        let control = connection.control();
        Self { control, connection }
    }
}

/// Drive `connection`, handing each freshly accepted inbound stream to
/// `on_stream`. Returns once the connection is closed or errors.
pub async fn drive<T, F, Fut>(
    mut connection: Connection<T>,
    mut on_stream: F,
) -> Result<(), MuxError>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    F: FnMut(MuxStream) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    loop {
        match connection.next().await {
            Some(Ok(stream)) => {
                tokio::spawn(on_stream(stream));
            }
            Some(Err(err)) => return Err(err.into()),
            None => return Ok(()),
        }
    }
}
