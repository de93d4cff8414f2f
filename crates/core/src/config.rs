// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (`hive.toml`).
//!
//! The config file carries the self host identity plus sync tuning. It
//! lives in the state directory and is required — the daemon refuses to
//! start without knowing who it is in the mesh.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::host::{validate_host_id, validate_host_url, Host, HostError, HostKind};

/// Default interval between sync-loop passes.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
/// Default per-candidate reachability probe timeout.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [host] section: {0}")]
    Host(#[from] HostError),
}

/// Identity this process advertises to the mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfHostConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Sync-loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_probe_timeout() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

/// Listener addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListenConfig {
    /// TCP port peers connect to. None disables the peer listener
    /// (single-host mode; the Unix socket still serves the CLI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: SelfHostConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub listen: ListenConfig,
}

impl Config {
    /// Load and validate `hive.toml`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        validate_host_id(&config.host.id)?;
        validate_host_url(&config.host.url)?;
        Ok(config)
    }

    /// Synthesize the self host record. Never persisted in the peer table.
    pub fn self_host(&self) -> Host {
        Host {
            id: self.host.id.clone(),
            name: self.host.name.clone(),
            url: self.host.url.clone(),
            kind: HostKind::Local,
            enabled: true,
            description: self.host.description.clone(),
            synced_at_ms: None,
            sync_source: None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
