// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary stream helper for status-213 bodies (§4.5): `ReadAt` and other bulk
//! operations reply with a JSON prologue (status 213) followed immediately,
//! on the same muxed stream, by the raw payload as one more length-prefixed
//! frame — so the reader never has to guess where JSON ends and bytes begin.

use d2d_proto::{read_framed, read_message, write_framed, write_message, ProtocolError, Response, Status};
use tokio::io::{AsyncRead, AsyncWrite};

/// Write `response`, followed by `body` as a length-prefixed frame if the
/// response's status is [`Status::StreamFollows`].
pub async fn write_response_with_body<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    body: &[u8],
) -> Result<(), ProtocolError> {
    write_framed(writer, response).await?;
    if response.status == Status::StreamFollows.as_u16() {
        write_message(writer, body).await?;
    }
    Ok(())
}

/// Read a response and, if it carries status 213, the trailing binary frame.
pub async fn read_response_with_body<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<(Response, Vec<u8>), ProtocolError> {
    let response: Response = read_framed(reader).await?;
    let body = if response.status == Status::StreamFollows.as_u16() {
        read_message(reader).await?
    } else {
        Vec::new()
    };
    Ok((response, body))
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
