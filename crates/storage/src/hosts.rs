// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable peer table.
//!
//! All lookups see the self record first; it is synthesized from config
//! at read time and never written to disk. Mutations validate before
//! touching state, and the whole check-then-insert sequence runs under
//! the store lock — concurrent inbound exchanges racing to add the same
//! newly-learned peer resolve to one insert and one `AlreadyKnown`.

use hive_core::{validate_host_id, validate_host_url, Host, HostKind};
use std::sync::Arc;
use tracing::debug;

use crate::mesh::{StoreError, StoreInner};

/// Result of a race-tolerant insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Lost the race or offered a known host — success, not an error
    AlreadyKnown,
}

/// Partial update for a stored host.
#[derive(Debug, Clone, Default)]
pub struct HostUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

/// Facade over the persisted peer table.
#[derive(Clone)]
pub struct HostStore {
    inner: Arc<StoreInner>,
    self_host: Host,
}

impl HostStore {
    pub(crate) fn new(inner: Arc<StoreInner>, self_host: Host) -> Self {
        HostStore { inner, self_host }
    }

    /// The synthesized local record.
    pub fn self_host(&self) -> &Host {
        &self.self_host
    }

    /// All known hosts: self first, then peers sorted by id.
    pub fn list(&self) -> Vec<Host> {
        let mut hosts = vec![self.self_host.clone()];
        hosts.extend(self.peers());
        hosts
    }

    /// Stored remote peers, sorted by id.
    pub fn peers(&self) -> Vec<Host> {
        self.inner.read(|state| {
            let mut peers = state.hosts.clone();
            peers.sort_by(|a, b| a.id.cmp(&b.id));
            peers
        })
    }

    pub fn get_by_id(&self, id: &str) -> Option<Host> {
        if id == self.self_host.id {
            return Some(self.self_host.clone());
        }
        self.inner.read(|state| state.hosts.iter().find(|h| h.id == id).cloned())
    }

    /// Find the id of the host (self included) already storing `url`.
    pub fn find_by_url(&self, url: &str) -> Option<String> {
        if url == self.self_host.url {
            return Some(self.self_host.id.clone());
        }
        self.inner
            .read(|state| state.hosts.iter().find(|h| h.url == url).map(|h| h.id.clone()))
    }

    /// Insert a new peer. Fails on id or url collision — the explicit-add
    /// path where the caller said "this is new" and must hear otherwise.
    pub fn add(&self, host: Host) -> Result<(), StoreError> {
        validate_host_id(&host.id)?;
        validate_host_url(&host.url)?;
        let self_host = self.self_host.clone();
        self.inner.mutate(move |state| {
            if host.id == self_host.id || state.hosts.iter().any(|h| h.id == host.id) {
                return Err(StoreError::DuplicateId(host.id));
            }
            if let Some(existing_id) = url_owner(&self_host, &state.hosts, &host.url) {
                return Err(StoreError::DuplicateUrl { url: host.url, existing_id });
            }
            state.hosts.push(stored(host));
            Ok(())
        })
    }

    /// Insert unless already known — the gossip fan-in path. Multiple
    /// inbound exchanges may offer the same peer concurrently; every
    /// caller gets success, exactly one gets `Added`.
    pub fn add_if_absent(&self, host: Host) -> Result<AddOutcome, StoreError> {
        validate_host_id(&host.id)?;
        validate_host_url(&host.url)?;
        let self_host = self.self_host.clone();
        self.inner.mutate(move |state| {
            if host.id == self_host.id
                || state.hosts.iter().any(|h| h.id == host.id)
                || url_owner(&self_host, &state.hosts, &host.url).is_some()
            {
                return Ok(AddOutcome::AlreadyKnown);
            }
            debug!(host = %host.id, url = %host.url, source = ?host.sync_source, "learned new host");
            state.hosts.push(stored(host));
            Ok(AddOutcome::Added)
        })
    }

    /// Patch a stored peer. Url changes re-run collision checks.
    pub fn update(&self, id: &str, patch: HostUpdate) -> Result<Host, StoreError> {
        if id == self.self_host.id {
            return Err(StoreError::SelfHost(id.to_string()));
        }
        if let Some(ref url) = patch.url {
            validate_host_url(url)?;
        }
        let self_host = self.self_host.clone();
        let id = id.to_string();
        self.inner.mutate(move |state| {
            if let Some(ref url) = patch.url {
                match url_owner(&self_host, &state.hosts, url) {
                    Some(owner) if owner != id => {
                        return Err(StoreError::DuplicateUrl {
                            url: url.clone(),
                            existing_id: owner,
                        })
                    }
                    _ => {}
                }
            }
            let host = state
                .hosts
                .iter_mut()
                .find(|h| h.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            if let Some(name) = patch.name {
                host.name = name;
            }
            if let Some(url) = patch.url {
                host.url = url;
            }
            if let Some(description) = patch.description {
                host.description = Some(description);
            }
            if let Some(enabled) = patch.enabled {
                host.enabled = enabled;
            }
            Ok(host.clone())
        })
    }

    /// Stamp a successful sync with this peer.
    pub fn record_sync(&self, id: &str, source: &str, at_ms: u64) -> Result<(), StoreError> {
        if id == self.self_host.id {
            return Err(StoreError::SelfHost(id.to_string()));
        }
        let id = id.to_string();
        let source = source.to_string();
        self.inner.mutate(move |state| {
            let host = state
                .hosts
                .iter_mut()
                .find(|h| h.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            host.synced_at_ms = Some(at_ms);
            host.sync_source = Some(source);
            Ok(())
        })
    }

    /// Delete a stored peer. Unreachable peers are never evicted
    /// automatically — this is the explicit path only.
    pub fn remove(&self, id: &str) -> Result<Host, StoreError> {
        if id == self.self_host.id {
            return Err(StoreError::SelfHost(id.to_string()));
        }
        let id = id.to_string();
        self.inner.mutate(move |state| {
            let pos = state
                .hosts
                .iter()
                .position(|h| h.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            Ok(state.hosts.remove(pos))
        })
    }
}

fn url_owner(self_host: &Host, peers: &[Host], url: &str) -> Option<String> {
    if url == self_host.url {
        return Some(self_host.id.clone());
    }
    peers.iter().find(|h| h.url == url).map(|h| h.id.clone())
}

/// Stored records are always remote; the local record never lands here.
fn stored(mut host: Host) -> Host {
    host.kind = HostKind::Remote;
    host
}

#[cfg(test)]
#[path = "hosts_tests.rs"]
mod tests;
