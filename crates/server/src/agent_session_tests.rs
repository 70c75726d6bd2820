// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::jobs::JobSpec;
use crate::session_manager::SessionManager;
use d2d_core::config::{JobConfig, TargetConfig};
use d2d_proto::{Request, Response};
use d2d_transport::{compat_stream, drive, FnHandler, Mux, Router, Session};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::duplex;
use tokio_util::compat::TokioAsyncReadCompatExt;
use yamux::Mode;

fn spec(job_id: &str, target_path: &str) -> JobSpec {
    JobSpec {
        job: JobConfig { id: job_id.to_string(), target: "t".to_string(), sub_path: None, datastore: "ds".to_string() },
        target: TargetConfig { name: "t".to_string(), path: target_path.to_string() },
    }
}

async fn connect_agent(backup_calls: Arc<AtomicUsize>, cleanup_calls: Arc<AtomicUsize>) -> SessionManager {
    let (client_io, server_io) = duplex(64 * 1024);
    let client_mux = Mux::new(client_io.compat(), Mode::Client);
    let server_mux = Mux::new(server_io.compat(), Mode::Server);

    let router = Router::builder()
        .register(
            "backup",
            FnHandler(move |req: Request| {
                let calls = backup_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(req.params["jobId"], "job-1");
                    Response::ok("acknowledged")
                }
            }),
        )
        .register(
            "cleanup",
            FnHandler(move |_req: Request| {
                let calls = cleanup_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Response::ok("acknowledged")
                }
            }),
        )
        .build();

    tokio::spawn(async move {
        let _ = drive(server_mux.connection, move |stream| {
            let router = router.clone();
            async move { router.serve_stream(compat_stream(stream)).await }
        })
        .await;
    });
    let driver = tokio::spawn(async move { drive(client_mux.connection, |_stream| async {}).await });

    let manager = SessionManager::new();
    manager.register("host-a", Session::new(client_mux.control), driver);
    manager
}

#[tokio::test]
async fn start_snapshot_calls_backup_with_the_jobs_drive() {
    let backup_calls = Arc::new(AtomicUsize::new(0));
    let cleanup_calls = Arc::new(AtomicUsize::new(0));
    let manager = connect_agent(backup_calls.clone(), cleanup_calls.clone()).await;

    let mut jobs = HashMap::new();
    jobs.insert("job-1".to_string(), spec("job-1", "agent://host-a/C"));
    let session = RemoteAgentSession::new(manager, jobs);

    session.start_snapshot("job-1").await.unwrap();
    assert_eq!(backup_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cleanup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn teardown_snapshot_calls_cleanup() {
    let backup_calls = Arc::new(AtomicUsize::new(0));
    let cleanup_calls = Arc::new(AtomicUsize::new(0));
    let manager = connect_agent(backup_calls, cleanup_calls.clone()).await;

    let mut jobs = HashMap::new();
    jobs.insert("job-1".to_string(), spec("job-1", "agent://host-a/C"));
    let session = RemoteAgentSession::new(manager, jobs);

    session.teardown_snapshot("job-1").await.unwrap();
    assert_eq!(cleanup_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fails_when_target_agent_is_not_connected() {
    let manager = SessionManager::new();
    let mut jobs = HashMap::new();
    jobs.insert("job-1".to_string(), spec("job-1", "agent://host-b/C"));
    let session = RemoteAgentSession::new(manager, jobs);

    let error = session.start_snapshot("job-1").await.unwrap_err();
    assert_eq!(error.kind(), d2d_core::ErrorKind::Transport);
}

#[tokio::test]
async fn fails_for_unknown_job() {
    let manager = SessionManager::new();
    let session = RemoteAgentSession::new(manager, HashMap::new());

    let error = session.start_snapshot("missing").await.unwrap_err();
    assert_eq!(error.kind(), d2d_core::ErrorKind::NotExist);
}
