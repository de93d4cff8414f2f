// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The peer-sync protocol: host discovery gossip.
//!
//! Two idempotent operations, `register-peer` and `exchange-peers`, each
//! guarded by the propagation tracker so replays short-circuit before
//! touching the host store. Gossip terminates because replays are no-ops
//! and an exchange only forwards hosts the sender itself stores — the
//! store grows only by verified-reachable insertions, so the reachable
//! set is finite and the fixed-point is reached once every host has
//! exchanged with every other reachable host at least once.

mod client;
mod probe;

pub use client::PeerClient;
pub use probe::{Prober, TcpProber};

#[cfg(any(test, feature = "test-support"))]
pub use probe::FakeProber;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use hive_core::{
    epoch_ms_now, validate_host_id, validate_host_url, Host, HostError, OrganizationState,
};
use hive_storage::{AddOutcome, HostStore, OrganizationError, OrganizationLedger, StoreError};
use hive_wire::{HostIdentity, PropagationMeta, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::directory::AgentDirectory;
use crate::propagation::PropagationTracker;

/// Errors from outbound sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("host {url:?} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error(transparent)]
    Invalid(#[from] HostError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("organization mismatch: peer reports {current:?}")]
    OrganizationMismatch { current: OrganizationState },

    #[error("peer returned error: {0}")]
    Peer(String),

    #[error("unexpected peer response: {0}")]
    UnexpectedResponse(String),
}

/// Categorized result of merging an offered host list.
#[derive(Debug, Default, Clone)]
pub struct MergeReport {
    pub newly_added: Vec<String>,
    pub already_known: Vec<String>,
    pub unreachable: Vec<String>,
}

/// The protocol state machine: host store, organization ledger,
/// propagation dedup, and the reachability seam. Constructed once at
/// startup and shared by the listener and the sync loop.
pub struct SyncService {
    hosts: HostStore,
    org: OrganizationLedger,
    tracker: Arc<PropagationTracker>,
    prober: Arc<dyn Prober>,
    probe_timeout: Duration,
}

impl SyncService {
    pub fn new(
        hosts: HostStore,
        org: OrganizationLedger,
        tracker: Arc<PropagationTracker>,
        prober: Arc<dyn Prober>,
        probe_timeout: Duration,
    ) -> Self {
        SyncService { hosts, org, tracker, prober, probe_timeout }
    }

    pub fn hosts(&self) -> &HostStore {
        &self.hosts
    }

    pub fn organization(&self) -> &OrganizationLedger {
        &self.org
    }

    /// Inbound register-peer: remember the caller, return who we are and
    /// everyone we know.
    pub fn handle_register(
        &self,
        host: HostIdentity,
        source: PropagationMeta,
        organization: Option<String>,
        organization_set_at_ms: Option<u64>,
        organization_set_by: Option<String>,
    ) -> Response {
        // Request-level validation rejects before any mutation
        if let Err(e) = validate_host_id(&host.id).and_then(|_| validate_host_url(&host.url)) {
            return Response::error(e);
        }

        if let Some(pid) = source.propagation_id.as_deref() {
            if self.tracker.has_processed(pid) {
                debug!(propagation_id = pid, "replayed registration, no-op");
                return self.registered_response(false, true, None);
            }
            self.tracker.mark_processed(pid);
        }

        let organization_adopted = match self.apply_incoming_org(
            organization.as_deref(),
            organization_set_at_ms.unwrap_or(source.timestamp_ms),
            organization_set_by.as_deref().unwrap_or(&source.initiator),
        ) {
            Ok(adopted) => adopted,
            Err(response) => return response,
        };

        let mut record = Host::remote(&host.id, &host.name, &host.url, "register");
        record.description = host.description.clone();
        let (registered, already_known) = match self.hosts.add_if_absent(record) {
            Ok(AddOutcome::Added) => {
                info!(host = %host.id, url = %host.url, "registered new peer");
                (true, false)
            }
            Ok(AddOutcome::AlreadyKnown) => (false, true),
            Err(e) => return Response::error(e),
        };

        self.registered_response(registered, already_known, organization_adopted)
    }

    /// Inbound exchange-peers: dedup, classify, probe candidates
    /// concurrently, store the reachable ones, report the delta.
    pub async fn handle_exchange(
        &self,
        from_host: HostIdentity,
        known_hosts: Vec<HostIdentity>,
        propagation_id: Option<String>,
        organization: Option<String>,
        organization_set_at_ms: Option<u64>,
        organization_set_by: Option<String>,
    ) -> Response {
        if let Some(pid) = propagation_id.as_deref() {
            if self.tracker.has_processed(pid) {
                debug!(propagation_id = pid, "replayed exchange, no-op");
                return self.exchanged_response(MergeReport::default(), None);
            }
            self.tracker.mark_processed(pid);
        }

        let organization_adopted = match self.apply_incoming_org(
            organization.as_deref(),
            organization_set_at_ms.unwrap_or_else(epoch_ms_now),
            organization_set_by.as_deref().unwrap_or(&from_host.id),
        ) {
            Ok(adopted) => adopted,
            Err(response) => return response,
        };

        let source_label = format!("peer-exchange:{}", from_host.id);
        match self.merge_offered(&from_host.id, known_hosts, &source_label).await {
            Ok(report) => self.exchanged_response(report, organization_adopted),
            Err(e) => Response::error(e),
        }
    }

    /// Merge an offered host list: dedup by id (first wins), drop
    /// malformed entries, skip self and sender, classify known hosts,
    /// probe the rest concurrently and store whatever answers.
    async fn merge_offered(
        &self,
        sender_id: &str,
        offered: Vec<HostIdentity>,
        source_label: &str,
    ) -> Result<MergeReport, StoreError> {
        let me = self.hosts.self_host().clone();
        let mut report = MergeReport::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<HostIdentity> = Vec::new();

        for identity in offered {
            if !seen.insert(identity.id.clone()) {
                continue;
            }
            // One malformed entry must not abort the rest of the list
            if validate_host_id(&identity.id).is_err() || validate_host_url(&identity.url).is_err()
            {
                warn!(host = %identity.id, url = %identity.url, "malformed peer entry, skipping");
                continue;
            }
            if identity.id == me.id || identity.url == me.url || identity.id == sender_id {
                continue;
            }
            if self.hosts.get_by_id(&identity.id).is_some() {
                report.already_known.push(identity.id);
                continue;
            }
            if let Some(existing_id) = self.hosts.find_by_url(&identity.url) {
                warn!(
                    offered = %identity.id,
                    existing = %existing_id,
                    url = %identity.url,
                    "same host advertised under a different id"
                );
                report.already_known.push(identity.id);
                continue;
            }
            candidates.push(identity);
        }

        // Fan-out/fan-in: all probes run concurrently, each bounded by
        // the probe timeout; the exchange completes after all resolve.
        let checks = candidates.into_iter().map(|identity| {
            let prober = Arc::clone(&self.prober);
            let timeout = self.probe_timeout;
            async move {
                let alive = prober.probe(&identity.url, timeout).await;
                (identity, alive)
            }
        });
        for (identity, alive) in futures_util::future::join_all(checks).await {
            if !alive {
                // Not stored: an unreachable host is not remembered
                debug!(host = %identity.id, url = %identity.url, "candidate unreachable");
                report.unreachable.push(identity.id);
                continue;
            }
            let mut record = Host::remote(&identity.id, &identity.name, &identity.url, source_label);
            record.description = identity.description.clone();
            match self.hosts.add_if_absent(record)? {
                AddOutcome::Added => report.newly_added.push(identity.id),
                AddOutcome::AlreadyKnown => report.already_known.push(identity.id),
            }
        }

        if !report.newly_added.is_empty() {
            info!(from = %sender_id, learned = ?report.newly_added, "learned hosts via exchange");
        }
        Ok(report)
    }

    /// Outbound join flow for an explicitly added peer: register against
    /// it, merge its bootstrap list, then gossip the change to the rest
    /// of the mesh (best-effort, non-blocking).
    pub async fn join_peer(
        &self,
        client: &PeerClient,
        identity: HostIdentity,
    ) -> Result<Response, SyncError> {
        validate_host_id(&identity.id)?;
        validate_host_url(&identity.url)?;
        let me = self.hosts.self_host().clone();
        if identity.id == me.id || identity.url == me.url {
            return Err(StoreError::SelfHost(identity.id).into());
        }
        if self.hosts.get_by_id(&identity.id).is_some() {
            return Err(StoreError::DuplicateId(identity.id).into());
        }
        if let Some(existing_id) = self.hosts.find_by_url(&identity.url) {
            return Err(StoreError::DuplicateUrl { url: identity.url, existing_id }.into());
        }

        let propagation_id = uuid::Uuid::new_v4().to_string();
        let source = PropagationMeta {
            initiator: me.id.clone(),
            timestamp_ms: epoch_ms_now(),
            propagation_id: Some(propagation_id.clone()),
            propagation_depth: Some(0),
        };
        let response = client
            .register(&identity.url, HostIdentity::from(&me), source, &self.org.get())
            .await?;

        match response {
            Response::Registered {
                success: true,
                host: peer,
                known_hosts,
                organization,
                organization_set_at_ms,
                organization_set_by,
                ..
            } => {
                if peer.id != identity.id {
                    warn!(dialed = %identity.id, advertised = %peer.id, "peer advertises a different id, storing its own");
                }
                // Store under the peer's advertised identity, but keep the
                // url we actually reached it on.
                let mut record = Host::remote(&peer.id, &peer.name, &identity.url, "register");
                record.description = peer.description.clone();
                record.synced_at_ms = Some(epoch_ms_now());
                let outcome = self.hosts.add_if_absent(record).map_err(SyncError::Store)?;

                self.adopt_from_peer(
                    &peer.id,
                    organization.as_deref(),
                    organization_set_at_ms,
                    organization_set_by.as_deref(),
                );

                // Its bootstrap list goes through the same verified merge
                // as an inbound exchange.
                let report = self
                    .merge_offered(&peer.id, known_hosts, "register")
                    .await
                    .map_err(SyncError::Store)?;
                info!(
                    peer = %peer.id,
                    learned = report.newly_added.len(),
                    "joined peer"
                );

                // Gossip the change to the rest of the mesh under the same
                // propagation id, so the event is processed once per host.
                self.broadcast_exchange(client.clone(), propagation_id, &[peer.id.clone()]);

                Ok(self.registered_response(
                    outcome == AddOutcome::Added,
                    outcome == AddOutcome::AlreadyKnown,
                    None,
                ))
            }
            Response::Registered { error, .. } => {
                Err(SyncError::Peer(error.unwrap_or_else(|| "registration refused".to_string())))
            }
            Response::OrgConflict { current } => Err(SyncError::OrganizationMismatch { current }),
            other => Err(SyncError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    /// Push our known-host list to every enabled peer except `exclude`.
    /// At-most-once, non-blocking: each send is a detached task and
    /// failure is logged, never propagated.
    pub fn broadcast_exchange(&self, client: PeerClient, propagation_id: String, exclude: &[String]) {
        let me = HostIdentity::from(self.hosts.self_host());
        let known: Vec<HostIdentity> = self.hosts.peers().iter().map(HostIdentity::from).collect();
        let org = self.org.get();

        for peer in
            self.hosts.peers().into_iter().filter(|p| p.enabled && !exclude.contains(&p.id))
        {
            let client = client.clone();
            let me = me.clone();
            let known = known.clone();
            let org = org.clone();
            let propagation_id = propagation_id.clone();
            tokio::spawn(async move {
                match client.exchange(&peer.url, me, known, Some(propagation_id), &org).await {
                    Ok(Response::Exchanged { newly_added, .. }) => {
                        debug!(peer = %peer.id, learned = newly_added.len(), "broadcast exchange done");
                    }
                    Ok(Response::OrgConflict { current }) => {
                        warn!(peer = %peer.id, current = ?current, "organization conflict during broadcast");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(peer = %peer.id, error = %e, "broadcast exchange failed"),
                }
            });
        }
    }

    /// One full sync against one peer: push our host list, pull its
    /// directory, stamp the sync.
    pub async fn sync_with_peer(
        &self,
        client: &PeerClient,
        host: &Host,
        directory: &AgentDirectory,
        propagation_id: &str,
    ) -> Result<usize, SyncError> {
        let me = HostIdentity::from(self.hosts.self_host());
        let known: Vec<HostIdentity> = self.hosts.peers().iter().map(HostIdentity::from).collect();

        let response = client
            .exchange(&host.url, me, known, Some(propagation_id.to_string()), &self.org.get())
            .await?;
        match response {
            Response::Exchanged {
                organization,
                organization_set_at_ms,
                organization_set_by,
                ..
            } => {
                self.adopt_from_peer(
                    &host.id,
                    organization.as_deref(),
                    organization_set_at_ms,
                    organization_set_by.as_deref(),
                );
            }
            Response::OrgConflict { current } => {
                return Err(SyncError::OrganizationMismatch { current });
            }
            other => return Err(SyncError::UnexpectedResponse(format!("{:?}", other))),
        }

        let entries = client.pull_directory(&host.url).await?;
        let merged = directory.merge_remote(entries, &host.id);
        self.hosts.record_sync(&host.id, "peer-sync", epoch_ms_now()).map_err(SyncError::Store)?;
        Ok(merged)
    }

    /// Apply an organization claim carried by an inbound request.
    /// A mismatch becomes the conflict response; only a storage failure
    /// is a plain error.
    fn apply_incoming_org(
        &self,
        name: Option<&str>,
        set_at_ms: u64,
        set_by: &str,
    ) -> Result<Option<bool>, Response> {
        let Some(name) = name else {
            return Ok(None);
        };
        match self.org.adopt(name, set_at_ms, set_by) {
            Ok(adoption) => Ok(Some(adoption.adopted)),
            Err(OrganizationError::Mismatch { current, current_name, incoming }) => {
                warn!(local = %current_name, incoming = %incoming, "organization conflict");
                Err(Response::OrgConflict { current })
            }
            Err(OrganizationError::Store(e)) => Err(Response::error(e)),
        }
    }

    /// Opportunistic adoption of a peer's organization claim from a
    /// response. A conflict is logged, not raised — the caller's sync
    /// already succeeded and there is no resolution policy to apply.
    fn adopt_from_peer(
        &self,
        peer_id: &str,
        name: Option<&str>,
        set_at_ms: Option<u64>,
        set_by: Option<&str>,
    ) {
        let Some(name) = name else { return };
        match self.org.adopt(
            name,
            set_at_ms.unwrap_or_else(epoch_ms_now),
            set_by.unwrap_or(peer_id),
        ) {
            Ok(adoption) if adoption.adopted => {
                info!(organization = %name, from = %peer_id, "adopted organization from peer");
            }
            Ok(_) => {}
            Err(OrganizationError::Mismatch { current_name, incoming, .. }) => {
                warn!(local = %current_name, incoming = %incoming, peer = %peer_id, "peer belongs to a different organization");
            }
            Err(e) => warn!(error = %e, "could not persist organization adoption"),
        }
    }

    fn registered_response(
        &self,
        registered: bool,
        already_known: bool,
        organization_adopted: Option<bool>,
    ) -> Response {
        let org = self.org.get();
        Response::Registered {
            success: true,
            registered,
            already_known,
            host: HostIdentity::from(self.hosts.self_host()),
            known_hosts: self.hosts.peers().iter().map(HostIdentity::from).collect(),
            organization: org.name,
            organization_set_at_ms: org.set_at_ms,
            organization_set_by: org.set_by,
            organization_adopted,
            error: None,
        }
    }

    fn exchanged_response(&self, report: MergeReport, organization_adopted: Option<bool>) -> Response {
        let org = self.org.get();
        Response::Exchanged {
            success: true,
            newly_added: report.newly_added,
            already_known: report.already_known,
            unreachable: report.unreachable,
            organization: org.name,
            organization_set_at_ms: org.set_at_ms,
            organization_set_by: org.set_by,
            organization_adopted,
            error: None,
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
