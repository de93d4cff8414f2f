// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted agent registry.
//!
//! The durable record of every agent this host has ever seen, including
//! offline ones — reconciliation overlays live sessions onto this set and
//! writes the result back in one pass. Name identity is case-insensitive;
//! stored records keep their original casing.

use chrono::{DateTime, Utc};
use hive_core::Agent;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::mesh::{rotate_bak_path, StoreError, CURRENT_STATE_VERSION};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryState {
    #[serde(rename = "v")]
    version: u32,
    agents: Vec<Agent>,
    saved_at: DateTime<Utc>,
}

impl Default for RegistryState {
    fn default() -> Self {
        RegistryState { version: CURRENT_STATE_VERSION, agents: Vec::new(), saved_at: Utc::now() }
    }
}

/// Durable agent records for this host.
pub struct AgentRegistry {
    path: PathBuf,
    state: Mutex<RegistryState>,
}

impl AgentRegistry {
    /// Open (or initialize) the registry file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RegistryState::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(AgentRegistry { path, state: Mutex::new(state) })
    }

    pub fn list(&self) -> Vec<Agent> {
        self.state.lock().agents.clone()
    }

    /// Case-insensitive name lookup.
    pub fn get_by_name(&self, name: &str) -> Option<Agent> {
        let lower = name.to_lowercase();
        self.state.lock().agents.iter().find(|a| a.name.to_lowercase() == lower).cloned()
    }

    /// Explicitly create an agent. Id and (case-insensitive) name must be
    /// unique on this host.
    pub fn insert(&self, agent: Agent) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let lower = agent.name.to_lowercase();
        if state.agents.iter().any(|a| a.id == agent.id || a.name.to_lowercase() == lower) {
            return Err(StoreError::DuplicateId(agent.id));
        }
        state.agents.push(agent);
        self.save(&mut state)
    }

    /// Replace the full agent set — the single write a reconciliation
    /// pass makes, regardless of how many agents or orphans it touched.
    pub fn replace_all(&self, agents: Vec<Agent>) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.agents = agents;
        self.save(&mut state)
    }

    fn save(&self, state: &mut RegistryState) -> Result<(), StoreError> {
        state.saved_at = Utc::now();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&*state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)?;
        if self.path.exists() {
            let _ = fs::rename(&self.path, rotate_bak_path(&self.path));
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
