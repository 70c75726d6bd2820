// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AgentFS client boundary (§4.11): "Consumes the §4.9 surface over aRPC".
//! Kept as a trait so the FUSE adapter doesn't depend on the transport
//! stack directly; `d2d-server` wires a real `Session`-backed
//! implementation, tests use an in-memory one.

use async_trait::async_trait;
use d2d_core::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteAttr {
    pub name: String,
    pub size: u64,
    pub mode: u32,
    pub mod_time_epoch_secs: u64,
    pub is_dir: bool,
    pub blocks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteDirEntry {
    pub name: String,
    pub mode: u32,
    pub size: u64,
    pub mod_time_epoch_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteStatFs {
    pub bsize: u64,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub name_len: u64,
}

/// The client-side view of §4.9's surface, one call per handler.
#[async_trait]
pub trait AgentFsClient: Send + Sync {
    async fn open_file(&self, path: &str) -> Result<u64, CoreError>;
    async fn attr(&self, path: &str) -> Result<RemoteAttr, CoreError>;
    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteDirEntry>, CoreError>;
    async fn read_at(&self, handle_id: u64, offset: u64, length: i64) -> Result<Vec<u8>, CoreError>;
    async fn close(&self, handle_id: u64) -> Result<(), CoreError>;
    async fn statfs(&self) -> Result<RemoteStatFs, CoreError>;
}

/// [`AgentFsClient`] backed by a live aRPC session (§6.2), one per mounted
/// job. Every call is prefixed with the job id the way the wire methods are
/// named (`<jobId>/OpenFile`); `d2d-transport`'s `Router` recovers the bare
/// operation name on the agent side.
pub struct TransportFsClient {
    session: tokio::sync::Mutex<d2d_transport::Session>,
    job_id: String,
}

impl TransportFsClient {
    pub fn new(session: d2d_transport::Session, job_id: impl Into<String>) -> Self {
        Self { session: tokio::sync::Mutex::new(session), job_id: job_id.into() }
    }

    fn method(&self, op: &str) -> String {
        format!("{}/{op}", self.job_id)
    }
}

#[async_trait]
impl AgentFsClient for TransportFsClient {
    async fn open_file(&self, path: &str) -> Result<u64, CoreError> {
        #[derive(Serialize)]
        struct Params<'a> {
            path: &'a str,
            flag: u32,
            perm: u32,
        }
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "handleId")]
            handle_id: u64,
        }
        let reply: Reply = self
            .session
            .lock()
            .await
            .call(&self.method("OpenFile"), Params { path, flag: 0, perm: 0 })
            .await?;
        Ok(reply.handle_id)
    }

    async fn attr(&self, path: &str) -> Result<RemoteAttr, CoreError> {
        #[derive(Serialize)]
        struct Params<'a> {
            path: &'a str,
        }
        self.session.lock().await.call(&self.method("Attr"), Params { path }).await
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteDirEntry>, CoreError> {
        #[derive(Serialize)]
        struct Params<'a> {
            path: &'a str,
        }
        self.session.lock().await.call(&self.method("ReadDir"), Params { path }).await
    }

    async fn read_at(&self, handle_id: u64, offset: u64, length: i64) -> Result<Vec<u8>, CoreError> {
        #[derive(Serialize)]
        struct Params {
            #[serde(rename = "handleId")]
            handle_id: u64,
            offset: i64,
            length: i32,
        }
        let (response, body) = self
            .session
            .lock()
            .await
            .call_with_buffer(
                &self.method("ReadAt"),
                Params { handle_id, offset: offset as i64, length: length as i32 },
            )
            .await?;
        if response.is_success() {
            Ok(body)
        } else {
            response.into_result()
        }
    }

    async fn close(&self, handle_id: u64) -> Result<(), CoreError> {
        #[derive(Serialize)]
        struct Params {
            #[serde(rename = "handleId")]
            handle_id: u64,
        }
        let _: String = self.session.lock().await.call(&self.method("Close"), Params { handle_id }).await?;
        Ok(())
    }

    async fn statfs(&self) -> Result<RemoteStatFs, CoreError> {
        self.session.lock().await.call(&self.method("StatFS"), ()).await
    }
}

/// In-memory [`AgentFsClient`] for tests: a fixed tree of files/directories
/// keyed by their full `secure_join`-relative path.
#[derive(Default)]
pub struct FakeAgentFsClient {
    pub files: HashMap<String, Vec<u8>>,
    pub dirs: HashMap<String, Vec<RemoteDirEntry>>,
}

#[async_trait]
impl AgentFsClient for FakeAgentFsClient {
    async fn open_file(&self, path: &str) -> Result<u64, CoreError> {
        if self.files.contains_key(path) {
            Ok(path.len() as u64 + 1)
        } else {
            Err(CoreError::not_exist(path.to_string()))
        }
    }

    async fn attr(&self, path: &str) -> Result<RemoteAttr, CoreError> {
        if let Some(data) = self.files.get(path) {
            Ok(RemoteAttr {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                size: data.len() as u64,
                mode: 0o100644,
                mod_time_epoch_secs: 0,
                is_dir: false,
                blocks: 0,
            })
        } else if self.dirs.contains_key(path) || path.is_empty() {
            Ok(RemoteAttr {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                size: 0,
                mode: 0o040755,
                mod_time_epoch_secs: 0,
                is_dir: true,
                blocks: 0,
            })
        } else {
            Err(CoreError::not_exist(path.to_string()))
        }
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteDirEntry>, CoreError> {
        self.dirs.get(path).cloned().ok_or_else(|| CoreError::not_exist(path.to_string()))
    }

    async fn read_at(&self, handle_id: u64, offset: u64, length: i64) -> Result<Vec<u8>, CoreError> {
        let path = self
            .files
            .iter()
            .find(|(p, _)| p.len() as u64 + 1 == handle_id)
            .map(|(p, _)| p.clone())
            .ok_or_else(|| CoreError::new(d2d_core::ErrorKind::Invalid, "unknown handle"))?;
        let data = &self.files[&path];
        let offset = offset as usize;
        if offset >= data.len() {
            return Ok(Vec::new());
        }
        let end = (offset + length.max(0) as usize).min(data.len());
        Ok(data[offset..end].to_vec())
    }

    async fn close(&self, _handle_id: u64) -> Result<(), CoreError> {
        Ok(())
    }

    async fn statfs(&self) -> Result<RemoteStatFs, CoreError> {
        Ok(RemoteStatFs { bsize: 4096, blocks: 0, bfree: 0, bavail: 0, files: 0, ffree: 0, name_len: 255 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use d2d_transport::{drive, Mux};
    use tokio::io::duplex;
    use tokio_util::compat::TokioAsyncReadCompatExt;
    use yamux::Mode;

    async fn client(job_id: &str) -> TransportFsClient {
        let (client_io, _server_io) = duplex(64 * 1024);
        let client_mux = Mux::new(client_io.compat(), Mode::Client);
        tokio::spawn(async move {
            let _ = drive(client_mux.connection, |_stream| async {}).await;
        });
        TransportFsClient::new(d2d_transport::Session::new(client_mux.control), job_id)
    }

    #[tokio::test]
    async fn method_is_prefixed_with_job_id() {
        let client = client("job-7").await;
        assert_eq!(client.method("OpenFile"), "job-7/OpenFile");
        assert_eq!(client.method("StatFS"), "job-7/StatFS");
    }
}
