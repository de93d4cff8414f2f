// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory specs: reconciliation feeding the local directory, and
//! remote entries flowing between hosts.

use super::prelude::*;
use hive_core::session_name;
use hive_daemon::{reconcile_sessions, AgentDirectory, FakeSessionAdapter, LiveSession};
use hive_storage::AgentRegistry;

const NOW: u64 = 1_700_000_000_000;

struct DirectoryHost {
    host: TestHost,
    registry: AgentRegistry,
    directory: AgentDirectory,
    adapter: FakeSessionAdapter,
}

impl DirectoryHost {
    fn new(id: &str) -> Self {
        let host = TestHost::new(id);
        let registry = AgentRegistry::open(host._dir.path().join("agents.json")).unwrap();
        let directory = AgentDirectory::new(host.hosts.self_host().clone());
        DirectoryHost { host, registry, directory, adapter: FakeSessionAdapter::new() }
    }

    fn live(&self, name: &str, index: u32) -> LiveSession {
        LiveSession {
            name: session_name(name, index),
            working_dir: "/srv".into(),
            created_at_ms: NOW - 60_000,
            last_active_ms: NOW - 1_000,
        }
    }

    /// One local pass: reconcile live sessions, rebuild the directory.
    async fn pass(&self, now_ms: u64) {
        let outcome =
            reconcile_sessions(&self.adapter, &self.registry, &self.host.id, now_ms).await;
        self.directory.rebuild_local(&outcome.agents);
    }
}

#[tokio::test]
async fn local_pass_produces_lookupable_entries() {
    let b = DirectoryHost::new("b");
    b.adapter.set_sessions(vec![b.live("Web", 0), b.live("Web", 1), b.live("scout", 0)]);
    b.pass(NOW).await;

    let entry = b.directory.lookup("web").unwrap();
    assert_eq!(entry.host_id, "b");
    assert_eq!(entry.host_url.as_deref(), Some("http://b:23000"));

    let (local, remote) = b.directory.counts();
    assert_eq!((local, remote), (2, 0));
}

#[tokio::test]
async fn remote_entries_flow_across_hosts_and_resolve() {
    let a = DirectoryHost::new("a");
    let b = DirectoryHost::new("b");

    b.adapter.set_sessions(vec![b.live("scout", 0)]);
    b.pass(NOW).await;

    // A pulls B's local entries during its sync pass
    let pulled = b.directory.local_entries();
    assert_eq!(a.directory.merge_remote(pulled, "b"), 1);

    let entry = a.directory.lookup("Scout").unwrap();
    assert_eq!(entry.host_id, "b");
    assert_eq!(entry.source.to_string(), "remote");
}

#[tokio::test]
async fn a_renamed_agent_disappears_from_later_pulls() {
    let a = DirectoryHost::new("a");
    let b = DirectoryHost::new("b");

    b.adapter.set_sessions(vec![b.live("scout", 0)]);
    b.pass(NOW).await;
    a.directory.merge_remote(b.directory.local_entries(), "b");

    // The scout session is gone; a new one appears under another name.
    // B's rebuild is a full replace, so the old name is not in the pull.
    b.adapter.set_sessions(vec![b.live("ranger", 0)]);
    b.pass(NOW + 60_000).await;

    let pulled = b.directory.local_entries();
    assert_eq!(pulled.len(), 2, "scout is offline but still registered");
    assert!(pulled.iter().any(|e| e.name == "ranger"));

    a.directory.merge_remote(pulled, "b");
    // A still resolves scout (stale remote data is acceptable), but the
    // fresher ranger entry is there too
    assert!(a.directory.lookup("ranger").is_some());
}

#[tokio::test]
async fn local_ownership_beats_remote_claims_of_the_same_name() {
    let a = DirectoryHost::new("a");
    let b = DirectoryHost::new("b");

    a.adapter.set_sessions(vec![a.live("relay", 0)]);
    a.pass(NOW).await;

    b.adapter.set_sessions(vec![b.live("relay", 0)]);
    b.pass(NOW + 1_000).await;

    // B's claim is fresher, but A owns the name locally
    a.directory.merge_remote(b.directory.local_entries(), "b");
    let entry = a.directory.lookup("relay").unwrap();
    assert_eq!(entry.host_id, "a");
    assert_eq!(entry.source.to_string(), "local");
}

#[tokio::test]
async fn orphan_adoption_survives_into_the_next_pull() {
    let b = DirectoryHost::new("b");

    b.adapter.set_sessions(vec![b.live("newcomer", 0)]);
    b.pass(NOW).await;
    assert!(b.registry.get_by_name("newcomer").unwrap().auto_registered);

    // Second pass: same session, no second adoption, entry still served
    b.pass(NOW + 60_000).await;
    let agents = b.registry.list();
    assert_eq!(agents.iter().filter(|a| a.name == "newcomer").count(), 1);
    assert!(b.directory.lookup("newcomer").is_some());
}
