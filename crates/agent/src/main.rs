// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `d2d-agentd`: the agent binary (§2's C6/C7/C8/C9 wired together). Loads
//! its config, bootstraps or renews its TLS credentials, dials the
//! coordinator, and serves AgentFS + lifecycle RPCs until the connection is
//! lost, at which point it reconnects.

use anyhow::{Context, Result};
use clap::Parser;
use d2d_agent::{connect, run_keepalive, JobRegistry};
use d2d_core::config::{AgentConfig, JobConfig};
use d2d_creds::CredentialManager;
use d2d_snapshot::{BtrfsHandler, LvmHandler, SourceSnapshotManager, ZfsHandler};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Agent process: credential bootstrap, per-job source-side snapshots, and
/// the AgentFS aRPC server role (§4.6, §4.8, §4.9).
#[derive(Parser, Debug)]
#[command(name = "d2d-agentd", version)]
struct Cli {
    /// Path to the agent's `AgentConfig` TOML file (§6.4: `ServerURL`, `BootstrapToken`).
    #[arg(long, default_value = "/etc/d2d-agent/agent.toml")]
    config: PathBuf,

    /// Path to the TOML file listing this agent's jobs (`[[job]]` array of `JobConfig`).
    #[arg(long, default_value = "/etc/d2d-agent/jobs.toml")]
    jobs: PathBuf,

    /// Path to the on-disk credential store written by `d2d-creds` (§4.6).
    #[arg(long, default_value = "/var/lib/d2d-agent/credentials.toml")]
    credentials: PathBuf,

    /// Root directory under which source-side snapshots are staged (btrfs/LVM, §4.8).
    #[arg(long, default_value = "/var/lib/d2d-agent/snapshots")]
    snapshot_root: PathBuf,

    /// Path to read mount information from (normally `/proc/mounts`).
    #[arg(long, default_value = "/proc/mounts")]
    proc_mounts: PathBuf,
}

#[derive(Debug, Deserialize)]
struct JobsFile {
    #[serde(default, rename = "job")]
    jobs: Vec<JobConfig>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .compact()
        .with_ansi(true)
        .init();
}

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

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

/// Splits an `AgentConfig::server_url` of the form `host:port` (or
/// `https://host:port`) into the dial address and the TLS server name.
fn split_server_url(server_url: &str) -> Result<(String, String)> {
    let without_scheme = server_url.splitn(2, "://").last().unwrap_or(server_url);
    let host = without_scheme.split(':').next().context("server_url missing host")?.to_string();
    Ok((without_scheme.to_string(), host))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AgentConfig::load(&cli.config)
        .with_context(|| format!("loading agent config from {}", cli.config.display()))?;
    let jobs_file: JobsFile = {
        let raw = std::fs::read_to_string(&cli.jobs)
            .with_context(|| format!("reading jobs file {}", cli.jobs.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing jobs file {}", cli.jobs.display()))?
    };
    let jobs: HashMap<String, JobConfig> = jobs_file.jobs.into_iter().map(|job| (job.id.clone(), job)).collect();
    info!(job_count = jobs.len(), "loaded job configuration");

    let hostname = local_hostname();
    let mut manager = CredentialManager::ensure(
        &cli.credentials,
        &config.server_url,
        &hostname,
        config.bootstrap_token.as_deref(),
        now_epoch_ms(),
    )
    .await
    .context("bootstrapping or loading credentials")?;

    let snapshots = Arc::new(SourceSnapshotManager::new(
        Box::new(BtrfsHandler::new(cli.snapshot_root.join("btrfs"))),
        Box::new(ZfsHandler::new()),
        Box::new(LvmHandler::new(cli.snapshot_root.join("lvm"))),
    ));
    let registry = Arc::new(JobRegistry::new(snapshots, jobs, cli.proc_mounts.clone()));
    let router = Arc::new(d2d_agent::build_router(registry.clone()));

    let (addr, host) = split_server_url(&config.server_url)?;
    let backoff = d2d_transport::BackoffPolicy::default();
    let mut attempt: u32 = 0;

    loop {
        let connection = match connect(&addr, &host, &hostname, manager.store(), router.clone()).await {
            Ok(connection) => connection,
            Err(error) => {
                let delay = backoff.delay_for_attempt(attempt);
                attempt += 1;
                error!(%error, delay_ms = delay.as_millis() as u64, "failed to connect to coordinator, retrying");
                tokio::time::sleep(delay).await;
                continue;
            }
        };
        attempt = 0;
        info!(%addr, %hostname, "connected to coordinator");

        let keepalive = tokio::spawn(run_keepalive(connection.control.clone(), None));
        let renewal_manager = &mut manager;

        tokio::select! {
            result = connection.join() => {
                if let Err(error) = result {
                    warn!(%error, "connection to coordinator lost, reconnecting");
                }
            }
            _ = async {
                loop {
                    tokio::time::sleep(d2d_creds::RENEWAL_INTERVAL).await;
                    if let Err(error) = renewal_manager.renew(now_epoch_ms()).await {
                        error!(%error, "credential renewal failed");
                    } else {
                        info!("credentials renewed");
                    }
                }
            } => {}
        }
        keepalive.abort();
    }
}
