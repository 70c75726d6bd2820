// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Method dispatch for inbound aRPC streams (§6.2). Both the agent and the
//! server register their exposed methods on a `Router` and hand every
//! inbound multiplexed stream to [`Router::serve_stream`], which reads the
//! one [`Request`] the stream carries, dispatches it, and writes back the
//! matching [`Response`] (plus a trailing bulk body for status 213).

use async_trait::async_trait;
use d2d_core::CoreError;
use d2d_proto::{read_framed, Request, Response};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncWrite};
use std::sync::Arc;

/// A single registered aRPC method. Implementations that never stream bulk
/// data can just return an empty `Vec` as the second tuple element.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: Request) -> (Response, Vec<u8>);
}

/// Adapt a plain async closure returning only `Response` into a `Handler`.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Response> + Send,
{
    async fn handle(&self, request: Request) -> (Response, Vec<u8>) {
        ((self.0)(request).await, Vec::new())
    }
}

#[derive(Default, Clone)]
pub struct Router {
    handlers: Arc<HashMap<String, Arc<dyn Handler>>>,
}

pub struct RouterBuilder {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder { handlers: HashMap::new() }
    }

    /// Read the single request a freshly accepted stream carries, dispatch
    /// it, and write the response (and bulk body, if any) back.
    pub async fn serve_stream<S: AsyncRead + AsyncWrite + Unpin + Send>(&self, mut stream: S) {
        let request: Request = match read_framed(&mut stream).await {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read request frame");
                return;
            }
        };
        let method = request.method.clone();
        let handler = self.handlers.get(&request.method).or_else(|| {
            // §6.2: agent methods are registered as `<jobId>/OpenFile` etc, with
            // the job id only known at job-start time. Handlers that want to
            // serve every job register under the bare operation name instead
            // (`OpenFile`) and recover the job id from `request.method` themselves.
            method.rsplit_once('/').and_then(|(_, op)| self.handlers.get(op))
        });
        let (response, body) = match handler {
            Some(handler) => handler.handle(request).await,
            None => (
                Response::error(&CoreError::new(
                    d2d_core::ErrorKind::NotExist,
                    format!("unknown method: {method}"),
                )),
                Vec::new(),
            ),
        };
        if let Err(err) = crate::stream::write_response_with_body(&mut stream, &response, &body).await
        {
            tracing::warn!(%method, error = %err, "failed to write response frame");
        }
    }
}

impl RouterBuilder {
    pub fn register(mut self, method: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.handlers.insert(method.into(), Arc::new(handler));
        self
    }

    pub fn build(self) -> Router {
        Router { handlers: Arc::new(self.handlers) }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
