// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the agent-side [`Router`] (§6.2). The agent is the RPC *server*
//! role on the muxed session (it accepted the dial), so it registers both
//! halves of the method surface: the eight job-prefixed AgentFS operations
//! (`<jobId>/OpenFile`, ...), and the three bare, job-independent methods
//! the coordinator calls to drive the snapshot lifecycle — `ping`, `backup`,
//! `cleanup`.

use crate::jobs::JobRegistry;
use d2d_agentfs::{Attr, DirEntry, OpenFileResult, SeekFrom as AgentSeekFrom, StatFsInfo, Xattr};
use d2d_core::{CoreError, ErrorKind};
use d2d_proto::{Request, Response};
use d2d_transport::{FnHandler, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Splits `<jobId>/Operation` into its two halves. The bare operation name
/// is what the `Router` has already matched on; this recovers the job id.
fn job_id_of(method: &str) -> Result<&str, CoreError> {
    method
        .rsplit_once('/')
        .map(|(job_id, _)| job_id)
        .ok_or_else(|| CoreError::new(ErrorKind::Invalid, format!("method missing job id prefix: {method}")))
}

fn params<P: for<'de> Deserialize<'de>>(request: &Request) -> Result<P, CoreError> {
    request.params_as().map_err(|e| CoreError::new(ErrorKind::Invalid, format!("bad params: {e}")))
}

fn respond<T: serde::Serialize>(result: Result<T, CoreError>) -> Response {
    match result {
        Ok(value) => Response::ok(value),
        Err(error) => Response::error(&error),
    }
}

async fn open_file(jobs: &JobRegistry, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Params {
        path: String,
        flag: u32,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        let handle_id = server.open_file(&params.path, params.flag)?;
        Ok::<_, CoreError>(OpenFileResult { handle_id })
    }
    .await;
    respond(outcome)
}

async fn attr(jobs: &JobRegistry, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Params {
        path: String,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        Ok::<Attr, CoreError>(server.attr(&params.path)?)
    }
    .await;
    respond(outcome)
}

async fn xattr(jobs: &JobRegistry, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Params {
        path: String,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        Ok::<Xattr, CoreError>(server.xattr(&params.path)?)
    }
    .await;
    respond(outcome)
}

async fn read_dir(jobs: &JobRegistry, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Params {
        path: String,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        Ok::<Vec<DirEntry>, CoreError>(server.read_dir(&params.path)?)
    }
    .await;
    respond(outcome)
}

async fn read_at(jobs: &JobRegistry, request: Request) -> (Response, Vec<u8>) {
    #[derive(Deserialize)]
    struct Params {
        #[serde(rename = "handleId")]
        handle_id: u64,
        offset: u64,
        length: i64,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        server.read_at(params.handle_id, params.offset, params.length)
    }
    .await;
    match outcome {
        Ok(body) => (Response::stream_follows(body.len()), body),
        Err(error) => (Response::error(&error), Vec::new()),
    }
}

async fn lseek(jobs: &JobRegistry, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Params {
        #[serde(rename = "handleId")]
        handle_id: u64,
        offset: i64,
        whence: AgentSeekFrom,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        Ok::<i64, CoreError>(server.lseek(params.handle_id, params.offset, params.whence)?)
    }
    .await;
    respond(outcome)
}

async fn close(jobs: &JobRegistry, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Params {
        #[serde(rename = "handleId")]
        handle_id: u64,
    }
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let params: Params = params(&request)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        server.close(params.handle_id)?;
        Ok::<&str, CoreError>("closed")
    }
    .await;
    respond(outcome)
}

async fn statfs(jobs: &JobRegistry, request: Request) -> Response {
    let outcome = async {
        let job_id = job_id_of(&request.method)?;
        let server = jobs
            .server_for(job_id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotExist, format!("no active snapshot for job {job_id}")))?;
        Ok::<StatFsInfo, CoreError>(server.statfs())
    }
    .await;
    respond(outcome)
}

/// `ping {} -> { version, hostname }` (§6.2): a liveness probe the
/// coordinator issues independent of any job.
async fn ping(_request: Request) -> Response {
    #[derive(serde::Serialize)]
    struct Pong {
        version: &'static str,
        hostname: String,
    }
    respond(Ok::<_, CoreError>(Pong { version: env!("CARGO_PKG_VERSION"), hostname: local_hostname() }))
}

#[derive(Deserialize)]
struct DriveParams {
    #[serde(rename = "jobId")]
    job_id: String,
    #[allow(dead_code)]
    drive: Option<String>,
}

/// `backup { jobId, drive } -> ack` (§6.2): creates the job's snapshot and
/// stands up its `AgentFsServer`, per the data flow in §2.
async fn backup(jobs: &JobRegistry, request: Request) -> Response {
    let outcome = async {
        let params: DriveParams = params(&request)?;
        jobs.start(&params.job_id).await
    }
    .await;
    respond(outcome.map(|()| "acknowledged"))
}

/// `cleanup { jobId, drive } -> ack` (§6.2): tears the job's `AgentFsServer`
/// and snapshot back down.
async fn cleanup(jobs: &JobRegistry, request: Request) -> Response {
    let outcome = async {
        let params: DriveParams = params(&request)?;
        jobs.teardown(&params.job_id).await
    }
    .await;
    respond(outcome.map(|()| "acknowledged"))
}

/// Best-effort local hostname for the `ping` reply; falls back to a
/// placeholder rather than failing the whole RPC if `gethostname(2)` errs.
fn local_hostname() -> String {
    #[cfg(unix)]
    {
        let mut buf = vec![0u8; 256];
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if rc == 0 {
            let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            if let Ok(name) = String::from_utf8(buf[..len].to_vec()) {
                return name;
            }
        }
    }
    "unknown".to_string()
}

/// Registers every AgentFS operation (§6.2, job-prefixed) plus the bare
/// `ping`/`backup`/`cleanup` methods the coordinator uses to drive the
/// snapshot lifecycle over the same session.
pub fn build_router(jobs: Arc<JobRegistry>) -> Router {
    let j = jobs.clone();
    let builder = Router::builder()
        .register("OpenFile", FnHandler(move |r| { let j = j.clone(); async move { open_file(&j, r).await } }));
    let j = jobs.clone();
    let builder = builder
        .register("Attr", FnHandler(move |r| { let j = j.clone(); async move { attr(&j, r).await } }));
    let j = jobs.clone();
    let builder = builder
        .register("Xattr", FnHandler(move |r| { let j = j.clone(); async move { xattr(&j, r).await } }));
    let j = jobs.clone();
    let builder = builder
        .register("ReadDir", FnHandler(move |r| { let j = j.clone(); async move { read_dir(&j, r).await } }));
    let j = jobs.clone();
    let builder = builder
        .register("Lseek", FnHandler(move |r| { let j = j.clone(); async move { lseek(&j, r).await } }));
    let j = jobs.clone();
    let builder = builder
        .register("Close", FnHandler(move |r| { let j = j.clone(); async move { close(&j, r).await } }));
    let j = jobs.clone();
    let builder = builder
        .register("StatFS", FnHandler(move |r| { let j = j.clone(); async move { statfs(&j, r).await } }));
    let builder = builder.register("ping", FnHandler(move |r| async move { ping(r).await }));
    let j = jobs.clone();
    let builder =
        builder.register("backup", FnHandler(move |r| { let j = j.clone(); async move { backup(&j, r).await } }));
    let j = jobs.clone();
    let builder =
        builder.register("cleanup", FnHandler(move |r| { let j = j.clone(); async move { cleanup(&j, r).await } }));

    // `ReadAt` streams a bulk body on success (§4.5), so it can't go through
    // `FnHandler` (which always replies with an empty body); it gets its own
    // `Handler` impl below.
    builder.register("ReadAt", ReadAtHandler(jobs)).build()
}

struct ReadAtHandler(Arc<JobRegistry>);

#[async_trait::async_trait]
impl d2d_transport::Handler for ReadAtHandler {
    async fn handle(&self, request: Request) -> (Response, Vec<u8>) {
        read_at(&self.0, request).await
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
