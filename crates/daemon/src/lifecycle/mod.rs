// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, the periodic sync loop, shutdown.

mod startup;
mod sync_loop;

pub use startup::run;
pub(crate) use sync_loop::{run_sync_loop, sync_pass};

use std::path::PathBuf;

use hive_core::ConfigError;
use hive_storage::StoreError;
use thiserror::Error;

use crate::env;

/// Filesystem layout under the state directory.
#[derive(Debug, Clone)]
pub struct DaemonPaths {
    /// Root state directory (e.g. ~/.local/state/hive)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to hive.toml (self identity + sync tuning)
    pub config_path: PathBuf,
    /// Path to the persisted mesh state (peer table + organization)
    pub mesh_path: PathBuf,
    /// Path to the persisted agent registry
    pub agents_path: PathBuf,
}

impl DaemonPaths {
    /// Resolve fixed paths under the state directory and make sure the
    /// directory exists. One daemon serves the whole host.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        std::fs::create_dir_all(&state_dir)?;

        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            config_path: state_dir.join("hive.toml"),
            mesh_path: state_dir.join("mesh.json"),
            agents_path: state_dir.join("agents.json"),
            state_dir,
        })
    }
}

/// Errors from daemon startup and shutdown.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot determine state directory (set HIVE_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no config at {0}: run `hive init` to create one")]
    MissingConfig(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("daemon already running with pid {0}")]
    AlreadyRunning(u32),
}
