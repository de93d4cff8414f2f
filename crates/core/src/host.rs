// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host records for the mesh peer table.
//!
//! A `Host` is one machine in the mesh. Exactly one host per process has
//! `kind = Local` — the self record — and it is synthesized from config at
//! read time, never written to the persisted peer table.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether a host record describes this process or a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    Local,
    Remote,
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// One machine in the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Mesh-unique, user-chosen slug
    pub id: String,
    /// Human-facing display name
    pub name: String,
    /// Advertised address, `[scheme://]host:port`
    pub url: String,
    pub kind: HostKind,
    /// Disabled hosts are kept but skipped by the sync loop
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Epoch milliseconds of the last successful sync with this host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at_ms: Option<u64>,
    /// How this host was learned, e.g. "manual", "register",
    /// "peer-exchange:<host-id>"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_source: Option<String>,
}

impl Host {
    /// Build a remote host record learned during sync.
    pub fn remote(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        sync_source: impl Into<String>,
    ) -> Self {
        Host {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            kind: HostKind::Remote,
            enabled: true,
            description: None,
            synced_at_ms: None,
            sync_source: Some(sync_source.into()),
        }
    }

    pub fn is_local(&self) -> bool {
        self.kind == HostKind::Local
    }
}

/// Request-level host validation failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("invalid host id {0:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidId(String),

    #[error("invalid host url {0:?}: expected [scheme://]host:port")]
    InvalidUrl(String),
}

/// Validate a host id: non-empty, ASCII letters, digits, `-`, `_` only.
pub fn validate_host_id(id: &str) -> Result<(), HostError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(HostError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Validate a host url: optional scheme, then `host:port` with a numeric port.
pub fn validate_host_url(url: &str) -> Result<(), HostError> {
    probe_addr(url).map(|_| ())
}

/// Strip the scheme (if any) and return the `host:port` connect address.
pub fn probe_addr(url: &str) -> Result<String, HostError> {
    let rest = match url.split_once("://") {
        Some((scheme, rest)) => {
            if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(HostError::InvalidUrl(url.to_string()));
            }
            rest
        }
        None => url,
    };
    // Trailing path segments are tolerated; everything after the first '/'
    // is not part of the connect address.
    let authority = rest.split('/').next().unwrap_or_default();
    let Some((hostname, port)) = authority.rsplit_once(':') else {
        return Err(HostError::InvalidUrl(url.to_string()));
    };
    if hostname.is_empty() || port.is_empty() || port.parse::<u16>().is_err() {
        return Err(HostError::InvalidUrl(url.to_string()));
    }
    Ok(format!("{}:{}", hostname, port))
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
