// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query types for reading daemon state.

use serde::{Deserialize, Serialize};

/// Read-only queries against daemon state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    ListHosts,
    GetHost {
        id: String,
    },
    GetOrganization,
    /// List this host's agents (post-reconciliation view)
    ListAgents,
    /// Case-insensitive name → location lookup across the directory
    LookupAgent {
        name: String,
    },
    /// Full directory entry set with summary counts
    DirectoryEntries,
}
