// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! d2d-transport: the self-healing aRPC transport (§4.1, §4.3, §4.4, §4.5).
//!
//! [`mux`] wraps the yamux multiplexer shared by the agent and server over
//! one mutually-authenticated TLS connection. [`Session`] opens a stream per
//! call and guards it with a [`circuit::CircuitBreaker`]; [`router::Router`]
//! does the inverse on the accepting side, dispatching inbound streams to
//! registered method handlers. [`stream`] carries bulk status-213 bodies.

pub mod backoff;
pub mod circuit;
pub mod mux;
pub mod router;
pub mod session;
pub mod stream;
pub mod tls;
pub mod upgrade;

pub use backoff::BackoffPolicy;
pub use circuit::CircuitBreaker;
pub use mux::{compat_stream, drive, Mux, MuxError, MuxStream};
pub use router::{FnHandler, Handler, Router};
pub use session::{Dialer, ReconnectConfig, Session};
pub use tls::{client_config, server_config, TlsSetupError};
pub use upgrade::{read_upgrade_request, send_upgrade_request, write_upgrade_response, UpgradeError};
