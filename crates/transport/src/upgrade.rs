// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pre-mux handshake (§6.1): "an HTTP GET to `/plus/arpc` with headers
//! `X-PBS-Agent: <hostname>`, `X-PBS-Plus-Version: <semver>`; the server
//! responds with status 101-equivalent upgrade, after which the connection
//! is taken over by the stream multiplexer." The exact response line
//! (`HTTP/1.1 101 Switching Protocols`) is this crate's resolution of the
//! open question spec.md leaves unspecified.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const UPGRADE_PATH: &str = "/plus/arpc";
const UPGRADE_RESPONSE_LINE: &str = "HTTP/1.1 101 Switching Protocols";

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("io error during upgrade: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed upgrade request")]
    MalformedRequest,
    #[error("server rejected upgrade: {0}")]
    Rejected(String),
}

/// Agent side: write the GET line and headers, then read back the status
/// line (and consume the header block up to the blank line that follows).
pub async fn send_upgrade_request<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    hostname: &str,
    version: &str,
) -> Result<(), UpgradeError> {
    let request = format!(
        "GET {UPGRADE_PATH} HTTP/1.1\r\nX-PBS-Agent: {hostname}\r\nX-PBS-Plus-Version: {version}\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let status_line = read_line(stream).await?;
    if !status_line.starts_with("HTTP/1.1 101") {
        return Err(UpgradeError::Rejected(status_line));
    }
    drain_headers(stream).await?;
    Ok(())
}

/// A parsed pre-mux GET request: the agent's claimed hostname and version.
pub struct UpgradeRequest {
    pub hostname: String,
    pub version: String,
}

/// Server side: read the GET line and headers, pulling out the two headers
/// the protocol cares about.
pub async fn read_upgrade_request<S: AsyncRead + Unpin>(
    stream: &mut S,
) -> Result<UpgradeRequest, UpgradeError> {
    let request_line = read_line(stream).await?;
    if !request_line.starts_with(&format!("GET {UPGRADE_PATH} ")) {
        return Err(UpgradeError::MalformedRequest);
    }

    let mut hostname = None;
    let mut version = None;
    loop {
        let line = read_line(stream).await?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim() {
            "X-PBS-Agent" => hostname = Some(value),
            "X-PBS-Plus-Version" => version = Some(value),
            _ => {}
        }
    }

    Ok(UpgradeRequest {
        hostname: hostname.ok_or(UpgradeError::MalformedRequest)?,
        version: version.ok_or(UpgradeError::MalformedRequest)?,
    })
}

/// Server side: write the upgrade response. After this, the caller hands
/// `stream` to `Mux::new(..., Mode::Server)`.
pub async fn write_upgrade_response<S: AsyncWrite + Unpin>(stream: &mut S) -> Result<(), UpgradeError> {
    stream.write_all(format!("{UPGRADE_RESPONSE_LINE}\r\n\r\n").as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// Reads one `\n`-terminated line directly off `stream`, one byte at a time.
/// This handshake precedes the yamux multiplexer taking over the same
/// connection, so it must never read ahead into bytes that belong to the
/// multiplexer — ruling out a `BufReader`, which would swallow them.
async fn read_line<S: AsyncRead + Unpin>(stream: &mut S) -> Result<String, UpgradeError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let read = stream.read(&mut byte).await?;
        if read == 0 {
            return Err(UpgradeError::MalformedRequest);
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }
    let text = String::from_utf8(line).map_err(|_| UpgradeError::MalformedRequest)?;
    Ok(text.trim_end_matches('\r').to_string())
}

async fn drain_headers<S: AsyncRead + Unpin>(stream: &mut S) -> Result<(), UpgradeError> {
    loop {
        let line = read_line(stream).await?;
        if line.is_empty() {
            return Ok(());
        }
    }
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
