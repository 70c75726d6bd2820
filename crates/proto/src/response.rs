// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reply to an aRPC [`Request`](crate::Request) (§6.3): a status code plus a
//! JSON body whose shape depends on the status — a typed result on success,
//! a serialised `CoreError` on failure, or a small prologue when the real
//! payload follows as a separate binary stream (status 213, §4.5).

use d2d_core::CoreError;
use serde::{Deserialize, Serialize};

use crate::status::Status;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub body: serde_json::Value,
}

impl Response {
    pub fn ok(body: impl Serialize) -> Self {
        Self {
            status: Status::Ok.as_u16(),
            body: serde_json::to_value(body).unwrap_or(serde_json::Value::Null),
        }
    }

    /// A status-213 reply: `body` is a small prologue (e.g. byte length) and
    /// the caller must read the actual payload off the side-channel stream.
    pub fn stream_follows(prologue: impl Serialize) -> Self {
        Self {
            status: Status::StreamFollows.as_u16(),
            body: serde_json::to_value(prologue).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn error(error: &CoreError) -> Self {
        let status = crate::status::status_for_error_kind(error.kind());
        Self {
            status: status.as_u16(),
            body: serde_json::to_value(error).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn status(&self) -> Option<Status> {
        Status::from_u16(self.status)
    }

    pub fn is_success(&self) -> bool {
        self.status().is_some_and(Status::is_success)
    }

    /// Decode the body as `T` on success, or as a `CoreError` on failure.
    pub fn into_result<T: for<'de> Deserialize<'de>>(self) -> Result<T, CoreError> {
        if self.is_success() {
            serde_json::from_value(self.body)
                .map_err(|e| CoreError::invalid(format!("malformed response body: {e}")))
        } else {
            match serde_json::from_value::<CoreError>(self.body) {
                Ok(err) => Err(err),
                Err(e) => Err(CoreError::invalid(format!("malformed error body: {e}"))),
            }
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
