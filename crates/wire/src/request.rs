// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::{HostIdentity, HostPatch, PropagationMeta, Query};

/// Request to the daemon, from the local CLI or from a peer host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping. Also the reachability probe peers send.
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Peer sync: "I am peer X, please remember me, and tell me who you
    /// know." Carries the organization claim when the caller has one.
    RegisterPeer {
        host: HostIdentity,
        source: PropagationMeta,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_at_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_by: Option<String>,
    },

    /// Peer sync: "Here is everyone I know; merge and tell me what was new."
    ExchangePeers {
        from_host: HostIdentity,
        known_hosts: Vec<HostIdentity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        propagation_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_at_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_set_by: Option<String>,
    },

    /// Peer sync: fetch this host's local directory entries.
    PullDirectory,

    /// Query state
    Query { query: Query },

    /// Add a peer host and run the full join flow against it
    HostAdd { host: HostIdentity },

    /// Patch a stored host
    HostUpdate { id: String, patch: HostPatch },

    /// Remove a stored host and its remote directory entries
    HostRemove { id: String },

    /// Sync now: pull directories from one enabled peer, or all
    HostSync {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Claim the mesh organization name from this host
    OrgSet { name: String },

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
