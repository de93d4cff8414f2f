// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hive_core::{DirectoryEntry, Host, OrganizationState};
use serde::{Deserialize, Serialize};

use super::{AgentSummary, DirectoryCounts, HostIdentity, LookupResult};

/// Response from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// register-peer result. Always carries the responder's identity (for
    /// back-registration) and its entire known-peer list so two hosts
    /// become fully cross-aware in one round trip.
    Registered {
        success: bool,
        registered: bool,
        already_known: bool,
        host: HostIdentity,
        known_hosts: Vec<HostIdentity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_at_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_by: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_adopted: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// exchange-peers result: the merge delta, categorized by host id.
    /// Partial success is normal — unreachable candidates land in
    /// `unreachable`, they do not fail the exchange.
    Exchanged {
        success: bool,
        newly_added: Vec<String>,
        already_known: Vec<String>,
        unreachable: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_at_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_by: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_adopted: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Organization conflict: the incoming claim differs from the local
    /// one. Distinct from failure — carries the responder's current state
    /// so the caller can reconcile manually.
    OrgConflict { current: OrganizationState },

    /// Current organization state
    Organization { organization: OrganizationState },

    /// List of known hosts (self first)
    Hosts { hosts: Vec<Host> },

    /// Single host
    Host { host: Option<Box<Host>> },

    /// List of agents on this host
    Agents { agents: Vec<AgentSummary> },

    /// Directory entries plus summary counts
    Directory { entries: Vec<DirectoryEntry>, counts: DirectoryCounts },

    /// Name → location lookup result
    Lookup { result: LookupResult },

    /// Result of a host add/sync operation
    Synced {
        synced: Vec<String>,
        failed: Vec<String>,
    },

    /// Daemon status
    Status {
        uptime_secs: u64,
        hosts_known: usize,
        agents_active: usize,
        directory_local: usize,
        directory_remote: usize,
    },

    /// Error response
    Error { message: String },
}

impl Response {
    /// Error response from any displayable error.
    pub fn error(err: impl std::fmt::Display) -> Self {
        Response::Error { message: err.to_string() }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
