// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! d2d-proto: the aRPC wire format (§4.2, §6.3).
//!
//! A single message is a length-prefixed JSON payload; a single call is a
//! [`Request`] written to a freshly opened multiplexed stream, answered with
//! exactly one [`Response`].

mod codec;
mod request;
mod response;
mod status;

pub use codec::{decode, encode, read_framed, read_message, write_framed, write_message, ProtocolError};
pub use request::Request;
pub use response::Response;
pub use status::{status_for_error_kind, Status};
