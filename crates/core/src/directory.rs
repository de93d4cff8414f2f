// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent directory entries: name → host(+address) resolution records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an entry is authoritative for this host or learned from a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Rebuilt from this host's own agent set; authoritative
    Local,
    /// Learned via peer sync; last-seen timestamped, may be stale
    Remote,
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// One name → location record in the agent directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub host_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    /// Address on the messaging fabric, when the agent registered one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp_address: Option<String>,
    #[serde(default)]
    pub amp_registered: bool,
    pub source: EntrySource,
    pub last_seen_ms: u64,
}
