// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the mesh specs.

use std::sync::Arc;
use std::time::Duration;

use hive_core::{Host, HostKind};
use hive_daemon::{FakeProber, PropagationTracker, Prober, SyncService};
use hive_storage::{HostStore, MeshStore, OrganizationLedger};
use hive_wire::HostIdentity;

/// One simulated mesh host: its own store, ledger, tracker, and prober.
pub struct TestHost {
    pub _dir: tempfile::TempDir,
    pub id: String,
    pub service: SyncService,
    pub hosts: HostStore,
    pub org: OrganizationLedger,
    pub prober: Arc<FakeProber>,
}

impl TestHost {
    pub fn new(id: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mesh = MeshStore::open(dir.path().join("mesh.json")).unwrap();
        let self_host = Host {
            id: id.to_string(),
            name: id.to_uppercase(),
            url: url_of(id),
            kind: HostKind::Local,
            enabled: true,
            description: None,
            synced_at_ms: None,
            sync_source: None,
        };
        let hosts = mesh.host_store(self_host);
        let org = mesh.organization();
        let prober = Arc::new(FakeProber::new());
        let service = SyncService::new(
            hosts.clone(),
            org.clone(),
            Arc::new(PropagationTracker::new(Duration::from_secs(600))),
            Arc::clone(&prober) as Arc<dyn Prober>,
            Duration::from_secs(5),
        );
        TestHost { _dir: dir, id: id.to_string(), service, hosts, org, prober }
    }

    pub fn identity(&self) -> HostIdentity {
        HostIdentity::from(self.hosts.self_host())
    }

    /// Everything this host knows, as it would offer in an exchange.
    pub fn known_identities(&self) -> Vec<HostIdentity> {
        self.hosts.peers().iter().map(HostIdentity::from).collect()
    }

    pub fn knows(&self, id: &str) -> bool {
        self.hosts.get_by_id(id).is_some()
    }
}

pub fn url_of(id: &str) -> String {
    format!("http://{}:23000", id)
}
