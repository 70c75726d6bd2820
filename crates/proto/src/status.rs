// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! aRPC status codes (§6.3): a small HTTP-flavoured set carried in every
//! response frame, used by the router to decide whether a reply's body is an
//! inline JSON value or the prologue to a binary stream.

use d2d_core::ErrorKind;
use serde::{Deserialize, Serialize};

/// Status carried on every `Response` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum Status {
    /// Inline JSON body follows in `Response.body`.
    Ok = 200,
    /// Body is a prologue; the payload is a separate binary stream (§4.5).
    StreamFollows = 213,
    Invalid = 400,
    Permission = 403,
    NotExist = 404,
    Conflict = 409,
    Unsupported = 422,
    Timeout = 504,
    Internal = 500,
}

impl Status {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Ok | Status::StreamFollows)
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        Some(match code {
            200 => Status::Ok,
            213 => Status::StreamFollows,
            400 => Status::Invalid,
            403 => Status::Permission,
            404 => Status::NotExist,
            409 => Status::Conflict,
            422 => Status::Unsupported,
            504 => Status::Timeout,
            500 => Status::Internal,
            _ => return None,
        })
    }
}

/// Map a core error kind to the status that represents it on the wire.
pub fn status_for_error_kind(kind: ErrorKind) -> Status {
    match kind {
        ErrorKind::NotExist => Status::NotExist,
        ErrorKind::Permission => Status::Permission,
        ErrorKind::Invalid | ErrorKind::InvalidSnapshot => Status::Invalid,
        ErrorKind::Unsupported => Status::Unsupported,
        ErrorKind::Timeout | ErrorKind::SnapshotTimeout => Status::Timeout,
        ErrorKind::JobAlreadyRunning => Status::Conflict,
        ErrorKind::NoTask => Status::NotExist,
        ErrorKind::Transport
        | ErrorKind::CircuitOpen
        | ErrorKind::SessionClosed
        | ErrorKind::SnapshotCreation => Status::Internal,
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
