// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent directory: name → host resolution across the mesh.
//!
//! Local entries are authoritative and rebuilt from scratch after every
//! reconciliation pass — a full replace, so renamed or removed agents
//! leave nothing behind. Remote entries are learned through peer sync,
//! keyed by `(name, host)` and last-seen timestamped; lookups accept
//! staleness rather than block on it.

use std::collections::HashMap;

use hive_core::{Agent, DirectoryEntry, EntrySource, Host};
use parking_lot::Mutex;
use tracing::debug;

/// In-memory directory, shared between the listener and the sync loop.
pub struct AgentDirectory {
    self_host: Host,
    /// (lower-cased name, host id) → entry
    entries: Mutex<HashMap<(String, String), DirectoryEntry>>,
}

impl AgentDirectory {
    pub fn new(self_host: Host) -> Self {
        AgentDirectory { self_host, entries: Mutex::new(HashMap::new()) }
    }

    /// Recompute all `source = local` entries from the current agent set.
    ///
    /// Full replace, never an incremental patch: every previous local
    /// entry is dropped first.
    pub fn rebuild_local(&self, agents: &[Agent]) {
        let mut entries = self.entries.lock();
        entries.retain(|_, e| e.source != EntrySource::Local);
        for agent in agents {
            let entry = DirectoryEntry {
                name: agent.name.clone(),
                host_id: self.self_host.id.clone(),
                host_url: Some(self.self_host.url.clone()),
                amp_address: agent.label.clone(),
                amp_registered: agent.label.is_some(),
                source: EntrySource::Local,
                last_seen_ms: agent.updated_at_ms,
            };
            entries.insert((agent.name.to_lowercase(), self.self_host.id.clone()), entry);
        }
    }

    /// The authoritative entries for this host, sorted by name.
    pub fn local_entries(&self) -> Vec<DirectoryEntry> {
        let mut local: Vec<DirectoryEntry> = self
            .entries
            .lock()
            .values()
            .filter(|e| e.source == EntrySource::Local)
            .cloned()
            .collect();
        local.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        local
    }

    /// Every entry, local first, then by name and host.
    pub fn all_entries(&self) -> Vec<DirectoryEntry> {
        let mut all: Vec<DirectoryEntry> = self.entries.lock().values().cloned().collect();
        all.sort_by(|a, b| {
            let rank = |e: &DirectoryEntry| match e.source {
                EntrySource::Local => 0,
                EntrySource::Remote => 1,
            };
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.host_id.cmp(&b.host_id))
        });
        all
    }

    /// `(local, remote)` entry counts.
    pub fn counts(&self) -> (usize, usize) {
        let entries = self.entries.lock();
        let local = entries.values().filter(|e| e.source == EntrySource::Local).count();
        (local, entries.len() - local)
    }

    /// Case-insensitive exact-match lookup. A local entry always wins;
    /// ties between remote claims resolve to the freshest `last_seen_ms`.
    pub fn lookup(&self, name: &str) -> Option<DirectoryEntry> {
        let lower = name.to_lowercase();
        let entries = self.entries.lock();
        let mut candidates: Vec<&DirectoryEntry> =
            entries.iter().filter(|((n, _), _)| *n == lower).map(|(_, e)| e).collect();
        if let Some(local) = candidates.iter().find(|e| e.source == EntrySource::Local) {
            return Some((*local).clone());
        }
        candidates.sort_by_key(|e| std::cmp::Reverse(e.last_seen_ms));
        candidates.first().map(|e| (*e).clone())
    }

    /// Upsert entries learned from `from_host`. Incoming entries are
    /// forced to `source = remote`; an entry claiming a name on this host
    /// is dropped — the local view is authoritative and a stale remote
    /// echo must never downgrade it. Returns how many entries changed.
    pub fn merge_remote(&self, incoming: Vec<DirectoryEntry>, from_host: &str) -> usize {
        let mut entries = self.entries.lock();
        let mut merged = 0;
        for mut entry in incoming {
            if entry.host_id == self.self_host.id {
                debug!(
                    name = %entry.name,
                    from = %from_host,
                    "ignoring remote echo of a locally-owned name"
                );
                continue;
            }
            entry.source = EntrySource::Remote;
            let key = (entry.name.to_lowercase(), entry.host_id.clone());
            match entries.get(&key) {
                Some(existing) if existing.last_seen_ms > entry.last_seen_ms => {}
                _ => {
                    entries.insert(key, entry);
                    merged += 1;
                }
            }
        }
        merged
    }

    /// Drop every remote entry learned for `host_id`. Used when a host is
    /// removed from the mesh.
    pub fn drop_host(&self, host_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(_, h), e| e.source == EntrySource::Local || h.as_str() != host_id);
        before - entries.len()
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
