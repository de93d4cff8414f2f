// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve state directory: HIVE_STATE_DIR > XDG_STATE_HOME/hive > ~/.local/state/hive
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("HIVE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("hive"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/hive"))
}

/// Default IPC timeout for CLI and peer calls
pub fn ipc_timeout() -> Duration {
    std::env::var("HIVE_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// TCP port override for the peer listener. Takes precedence over the
/// `[listen]` section of hive.toml.
pub fn tcp_port() -> Option<u16> {
    std::env::var("HIVE_TCP_PORT").ok().and_then(|s| s.parse::<u16>().ok())
}

/// Retention window for processed propagation ids. Expiry is a memory
/// bound, not a correctness requirement — replaying a converged
/// propagation is harmless, merely wasteful.
pub fn propagation_ttl() -> Duration {
    std::env::var("HIVE_PROPAGATION_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(600))
}

/// Sync-loop interval override
pub fn sync_interval_override() -> Option<Duration> {
    std::env::var("HIVE_SYNC_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
