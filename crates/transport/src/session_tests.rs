// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::mux::{drive, Mux};
use crate::router::{FnHandler, Router};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::duplex;
use tokio_util::compat::TokioAsyncReadCompatExt;
use yamux::Mode;

async fn connected_pair() -> (Session, Control) {
    let (client_io, server_io) = duplex(64 * 1024);
    let client_mux = Mux::new(client_io.compat(), Mode::Client);
    let server_mux = Mux::new(server_io.compat(), Mode::Server);

    let router = Router::builder()
        .register(
            "Ping",
            FnHandler(|_req: Request| async { Response::ok(serde_json::json!({"pong": true})) }),
        )
        .build();

    tokio::spawn(async move {
        let _ = drive(server_mux.connection, move |stream| {
            let router = router.clone();
            async move { router.serve_stream(compat_stream(stream)).await }
        })
        .await;
    });
    tokio::spawn(async move {
        let _ = drive(client_mux.connection, |_stream| async {}).await;
    });

    (Session::new(client_mux.control.clone()), client_mux.control)
}

#[tokio::test]
async fn call_round_trips_through_router() {
    let (mut session, _control) = connected_pair().await;
    let resp: serde_json::Value = session.call("Ping", ()).await.unwrap();
    assert_eq!(resp["pong"], true);
}

#[tokio::test]
async fn unknown_method_surfaces_as_not_exist() {
    let (mut session, _control) = connected_pair().await;
    let err = session.call::<_, serde_json::Value>("NoSuchMethod", ()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotExist);
}

#[tokio::test]
async fn circuit_opens_after_repeated_transport_failures() {
    let (client_io, server_io) = duplex(64 * 1024);
    drop(server_io);
    let client_mux = Mux::new(client_io.compat(), Mode::Client);
    tokio::spawn(async move {
        let _ = drive(client_mux.connection, |_stream| async {}).await;
    });
    let mut session = Session::with_clock(client_mux.control, d2d_core::FakeClock::new());

    for _ in 0..5 {
        let _ = session.call::<_, serde_json::Value>("Ping", ()).await;
    }
    assert!(session.circuit_is_open());
    let err = session.call::<_, serde_json::Value>("Ping", ()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CircuitOpen);
}

fn tiny_backoff() -> BackoffPolicy {
    BackoffPolicy { initial: Duration::from_millis(1), max: Duration::from_millis(5), multiplier: 2.0 }
}

/// Fails its first `fail_first_n` dials, then hands back the control of a
/// brand new in-process connected pair, simulating the agent redialing and
/// the coordinator observing a freshly registered session.
struct ScriptedDialer {
    fail_first_n: usize,
    attempts: AtomicUsize,
}

#[async_trait]
impl Dialer for ScriptedDialer {
    async fn dial(&self) -> Result<Control, CoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first_n {
            return Err(CoreError::new(ErrorKind::Transport, "dial failed"));
        }
        let (_session, control) = connected_pair().await;
        Ok(control)
    }
}

struct AlwaysFailDialer;

#[async_trait]
impl Dialer for AlwaysFailDialer {
    async fn dial(&self) -> Result<Control, CoreError> {
        Err(CoreError::new(ErrorKind::Transport, "dial always fails"))
    }
}

#[tokio::test]
async fn call_reconnects_through_dialer_after_transport_failure() {
    let (client_io, server_io) = duplex(64 * 1024);
    drop(server_io);
    let client_mux = Mux::new(client_io.compat(), Mode::Client);
    tokio::spawn(async move {
        let _ = drive(client_mux.connection, |_stream| async {}).await;
    });

    let dialer = Arc::new(ScriptedDialer { fail_first_n: 1, attempts: AtomicUsize::new(0) });
    let config = ReconnectConfig { backoff: tiny_backoff(), max_retries: 5 };
    let mut session = Session::with_reconnect(client_mux.control, dialer, config);

    let resp: serde_json::Value = session.call("Ping", ()).await.unwrap();
    assert_eq!(resp["pong"], true);
    assert!(!session.circuit_is_open());
}

#[tokio::test]
async fn reconnect_exhaustion_forces_circuit_open() {
    let (client_io, server_io) = duplex(64 * 1024);
    drop(server_io);
    let client_mux = Mux::new(client_io.compat(), Mode::Client);
    tokio::spawn(async move {
        let _ = drive(client_mux.connection, |_stream| async {}).await;
    });

    let dialer = Arc::new(AlwaysFailDialer);
    let config = ReconnectConfig { backoff: tiny_backoff(), max_retries: 2 };
    let mut session = Session::with_reconnect(client_mux.control, dialer, config);

    let err = session.call::<_, serde_json::Value>("Ping", ()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CircuitOpen);
    assert!(session.circuit_is_open());
}
