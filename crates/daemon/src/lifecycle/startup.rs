// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and the main wait loop.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hive_core::Config;
use hive_storage::{AgentRegistry, MeshStore};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{sync_pass, DaemonPaths, LifecycleError};
use crate::adapters::{NoOpSessionAdapter, SessionAdapter, TmuxSessionAdapter};
use crate::directory::AgentDirectory;
use crate::env;
use crate::listener::{ListenCtx, Listener};
use crate::propagation::PropagationTracker;
use crate::sync::{PeerClient, Prober, SyncService, TcpProber};

/// Start the daemon and block until shutdown is requested.
pub async fn run(paths: DaemonPaths) -> Result<(), LifecycleError> {
    let config = load_config(&paths)?;
    acquire_pid_lock(&paths.lock_path)?;

    let self_host = config.self_host();
    info!(host = %self_host.id, url = %self_host.url, "starting hived");

    let mesh = MeshStore::open(&paths.mesh_path)?;
    let hosts = mesh.host_store(self_host.clone());
    let registry = Arc::new(AgentRegistry::open(&paths.agents_path)?);

    let probe_timeout = Duration::from_secs(config.sync.probe_timeout_secs);
    let sync = Arc::new(SyncService::new(
        hosts,
        mesh.organization(),
        Arc::new(PropagationTracker::new(env::propagation_ttl())),
        Arc::new(TcpProber::new()) as Arc<dyn Prober>,
        probe_timeout,
    ));

    let sessions: Arc<dyn SessionAdapter> =
        match std::env::var("HIVE_SESSION_ADAPTER").as_deref() {
            Ok("none") => Arc::new(NoOpSessionAdapter::new()),
            _ => Arc::new(TmuxSessionAdapter::new()),
        };

    let ctx = Arc::new(ListenCtx {
        sync,
        client: PeerClient::new(env::ipc_timeout()),
        registry,
        directory: Arc::new(AgentDirectory::new(self_host)),
        sessions,
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    });

    // A leftover socket from an unclean exit would make bind fail
    if paths.socket_path.exists() {
        fs::remove_file(&paths.socket_path)?;
    }
    let unix = UnixListener::bind(&paths.socket_path)?;

    let listener = match env::tcp_port().or(config.listen.tcp_port) {
        Some(port) => {
            let tcp = TcpListener::bind(("0.0.0.0", port)).await?;
            info!(port, "peer listener on TCP");
            Listener::with_tcp(unix, tcp, Arc::clone(&ctx))
        }
        None => {
            info!("no TCP port configured, peers cannot reach this host");
            Listener::new(unix, Arc::clone(&ctx))
        }
    };

    let cancel = CancellationToken::new();
    let listener_task = tokio::spawn(listener.run());
    let interval = env::sync_interval_override()
        .unwrap_or(Duration::from_secs(config.sync.interval_secs));
    let sync_task =
        tokio::spawn(super::run_sync_loop(Arc::clone(&ctx), interval, cancel.clone()));

    // First pass right away so the directory is useful before the timer fires
    sync_pass(&ctx).await;
    println!("READY");

    tokio::select! {
        _ = ctx.shutdown.notified() => info!("shutdown requested"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    cancel.cancel();
    let _ = sync_task.await;
    listener_task.abort();

    let _ = fs::remove_file(&paths.socket_path);
    let _ = fs::remove_file(&paths.lock_path);
    info!("hived stopped");
    Ok(())
}

fn load_config(paths: &DaemonPaths) -> Result<Config, LifecycleError> {
    if !paths.config_path.exists() {
        return Err(LifecycleError::MissingConfig(paths.config_path.clone()));
    }
    Ok(Config::load(&paths.config_path)?)
}

/// Take the pid lock, refusing to start when another daemon holds it.
///
/// Liveness is checked through /proc; where that is unavailable the lock
/// is assumed stale, which matches the unclean-exit case.
fn acquire_pid_lock(lock_path: &Path) -> Result<(), LifecycleError> {
    if let Ok(contents) = fs::read_to_string(lock_path) {
        if let Ok(pid) = contents.trim().parse::<u32>() {
            if Path::new("/proc").exists() && Path::new(&format!("/proc/{pid}")).exists() {
                return Err(LifecycleError::AlreadyRunning(pid));
            }
            warn!(pid, "replacing stale pid lock");
        }
    }
    fs::write(lock_path, std::process::id().to_string())?;
    Ok(())
}
