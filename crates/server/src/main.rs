// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `d2d-serverd`: the coordinator binary (§2's C3/C11/C12/C13 wired
//! together). Starts the agent-facing TLS listener in the background, then
//! runs one job to completion and exits — this process doesn't own a
//! scheduler (timer generation is out of scope, §REDESIGN).

use anyhow::{Context, Result};
use clap::Parser;
use d2d_core::JobId;
use d2d_orchestrator::{JobRun, Orchestrator};
use d2d_server::{FuseMountHandle, RemoteAgentSession, ServerConfig, SessionManager};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "d2d-serverd", version)]
struct Cli {
    /// Path to the coordinator's `ServerConfig` TOML file (§6.4).
    #[arg(long, default_value = "/etc/d2d-server/server.toml")]
    config: PathBuf,

    /// The job id to run once the target agent is connected.
    #[arg(long)]
    run: String,

    /// The backup id to record the run under.
    #[arg(long)]
    backup_id: String,

    /// How long to wait for the job's target agent to connect before giving up.
    #[arg(long, default_value_t = 30)]
    connect_timeout_secs: u64,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .compact()
        .with_ansi(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ServerConfig::load(&cli.config)
        .with_context(|| format!("loading server config from {}", cli.config.display()))?;
    let job_specs = config.job_specs().context("resolving job/target configuration")?;
    let jobs: HashMap<String, _> = job_specs.into_iter().map(|spec| (spec.job.id.clone(), spec)).collect();
    let job_spec = jobs.get(&cli.run).with_context(|| format!("no such job {:?}", cli.run))?.clone();

    let sessions = SessionManager::new();
    let mount: Arc<dyn d2d_orchestrator::MountHandle> =
        Arc::new(FuseMountHandle::new(config.mount_root.clone(), sessions.clone(), jobs.clone()));
    let shutdown = CancellationToken::new();

    let listener = {
        let sessions = sessions.clone();
        let mount = mount.clone();
        let cert_pem = std::fs::read_to_string(&config.tls_cert_path).context("reading tls_cert_path")?;
        let key_pem = std::fs::read_to_string(&config.tls_key_path).context("reading tls_key_path")?;
        let ca_pem = std::fs::read_to_string(&config.ca_cert_path).context("reading ca_cert_path")?;
        let listen_addr = config.listen_addr.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(error) =
                d2d_server::run_listener(&listen_addr, &cert_pem, &key_pem, &ca_pem, sessions, mount, shutdown).await
            {
                error!(%error, "listener exited");
            }
        })
    };

    let agent_path = job_spec.agent_path().context("resolving job target")?;
    info!(host = %agent_path.host, "waiting for agent to connect");
    tokio::time::timeout(std::time::Duration::from_secs(cli.connect_timeout_secs), async {
        loop {
            if sessions.get(&agent_path.host).is_some() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
    })
    .await
    .with_context(|| format!("agent {} did not connect in time", agent_path.host))?;

    let agent_session = Arc::new(RemoteAgentSession::new(sessions.clone(), jobs.clone()));
    let orchestrator = Orchestrator::new(agent_session, mount);

    let run = JobRun {
        job_id: JobId::new(cli.run.clone()).with_context(|| format!("invalid job id {:?}", cli.run))?,
        datastore: job_spec.job.datastore.clone(),
        backup_id: cli.backup_id,
        utility_command: config.utility_command.clone(),
        task_log_dir: config.task_log_dir.clone(),
        retry: config.retry,
    };

    let outcome = orchestrator.run(run).await.context("running job")?;
    info!(?outcome, "job run complete");

    shutdown.cancel();
    let _ = listener.await;
    Ok(())
}
