// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTO structs for the wire protocol.

use hive_core::{Agent, DirectoryEntry, Host};
use serde::{Deserialize, Serialize};

/// Host identity as carried in peer-sync messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternate names this host answers to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl From<&Host> for HostIdentity {
    fn from(h: &Host) -> Self {
        HostIdentity {
            id: h.id.clone(),
            name: h.name.clone(),
            url: h.url.clone(),
            description: h.description.clone(),
            aliases: Vec::new(),
        }
    }
}

/// Provenance of one logical gossip event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationMeta {
    /// Host id that originated the event
    pub initiator: String,
    pub timestamp_ms: u64,
    /// Opaque dedup token; replays of a processed id are no-ops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation_depth: Option<u32>,
}

/// Partial update for a stored host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Agent listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub host_id: String,
    pub status: String,
    pub sessions: usize,
    pub online: usize,
    #[serde(default)]
    pub auto_registered: bool,
    pub updated_at_ms: u64,
}

impl From<&Agent> for AgentSummary {
    fn from(a: &Agent) -> Self {
        AgentSummary {
            id: a.id.clone(),
            name: a.name.clone(),
            label: a.label.clone(),
            host_id: a.host_id.clone(),
            status: a.status.to_string(),
            sessions: a.sessions.len(),
            online: a.online_sessions(),
            auto_registered: a.auto_registered,
            updated_at_ms: a.updated_at_ms,
        }
    }
}

/// Name → location query result, consumed by message routing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp_registered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_ms: Option<u64>,
}

impl LookupResult {
    pub fn miss() -> Self {
        LookupResult::default()
    }

    pub fn hit(entry: &DirectoryEntry) -> Self {
        LookupResult {
            found: true,
            name: Some(entry.name.clone()),
            host_id: Some(entry.host_id.clone()),
            host_url: entry.host_url.clone(),
            amp_address: entry.amp_address.clone(),
            amp_registered: Some(entry.amp_registered),
            source: Some(entry.source.to_string()),
            last_seen_ms: Some(entry.last_seen_ms),
        }
    }
}

/// Directory summary counts returned alongside entry listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryCounts {
    pub local: usize,
    pub remote: usize,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
