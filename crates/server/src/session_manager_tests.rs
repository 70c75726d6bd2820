// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use d2d_proto::Response;
use d2d_transport::{compat_stream, drive, FnHandler, Mux, Router};
use tokio::io::duplex;
use tokio_util::compat::TokioAsyncReadCompatExt;
use yamux::Mode;

fn connected_session() -> (Session, JoinHandle<Result<(), MuxError>>) {
    let (client_io, server_io) = duplex(64 * 1024);
    let client_mux = Mux::new(client_io.compat(), Mode::Client);
    let server_mux = Mux::new(server_io.compat(), Mode::Server);

    let router =
        Router::builder().register("ping", FnHandler(|_req| async { Response::ok(serde_json::json!({})) })).build();
    tokio::spawn(async move {
        let _ = drive(server_mux.connection, move |stream| {
            let router = router.clone();
            async move { router.serve_stream(compat_stream(stream)).await }
        })
        .await;
    });
    let driver =
        tokio::spawn(async move { drive(client_mux.connection, |_stream| async {}).await });

    (Session::new(client_mux.control), driver)
}

#[tokio::test]
async fn register_tracks_session_by_hostname() {
    let manager = SessionManager::new();
    let (session, driver) = connected_session();
    let (managed, orphaned) = manager.register("host-a", session, driver);
    assert!(orphaned.is_empty());
    managed.track_job("job-1");

    assert!(manager.get("host-a").is_some());
    assert!(manager.get("host-b").is_none());
}

#[tokio::test]
async fn reconnecting_the_same_hostname_replaces_the_prior_session_and_returns_its_jobs() {
    let manager = SessionManager::new();
    let (session_a, driver_a) = connected_session();
    let (managed_a, _) = manager.register("host-a", session_a, driver_a);
    managed_a.track_job("job-1");
    managed_a.track_job("job-2");

    let (session_b, driver_b) = connected_session();
    let (_managed_b, orphaned) = manager.register("host-a", session_b, driver_b);

    let mut orphaned = orphaned;
    orphaned.sort();
    assert_eq!(orphaned, vec!["job-1".to_string(), "job-2".to_string()]);
}

#[tokio::test]
async fn remove_returns_the_jobs_that_were_mounted_through_it() {
    let manager = SessionManager::new();
    let (session, driver) = connected_session();
    let (managed, _) = manager.register("host-a", session, driver);
    managed.track_job("job-1");

    let orphaned = manager.remove("host-a");
    assert_eq!(orphaned, vec!["job-1".to_string()]);
    assert!(manager.get("host-a").is_none());
}

#[tokio::test]
async fn remove_of_unknown_hostname_returns_empty() {
    let manager = SessionManager::new();
    assert!(manager.remove("never-connected").is_empty());
}
