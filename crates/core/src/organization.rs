// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mesh-wide organization name.
//!
//! At most one organization name is active across the mesh. The first host
//! to set it wins; peers adopt it when they have none. A different incoming
//! name is a conflict, never an overwrite — see the ledger in hive-storage.

use serde::{Deserialize, Serialize};

/// The organization claim as stored locally. All fields are set together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Epoch milliseconds when the name was first set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_at_ms: Option<u64>,
    /// Host id that set the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_by: Option<String>,
}

impl OrganizationState {
    pub fn is_set(&self) -> bool {
        self.name.is_some()
    }

    pub fn claimed(name: impl Into<String>, set_at_ms: u64, set_by: impl Into<String>) -> Self {
        OrganizationState {
            name: Some(name.into()),
            set_at_ms: Some(set_at_ms),
            set_by: Some(set_by.into()),
        }
    }
}
