// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::propagation::PropagationTracker;
use hive_core::HostKind;
use hive_storage::MeshStore;

struct Fixture {
    _dir: tempfile::TempDir,
    service: SyncService,
    prober: Arc<FakeProber>,
    hosts: HostStore,
    org: OrganizationLedger,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let mesh = MeshStore::open(dir.path().join("mesh.json")).unwrap();
    let self_host = Host {
        id: "a".to_string(),
        name: "A".to_string(),
        url: "http://a:23000".to_string(),
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
    Fixture { _dir: dir, service, prober, hosts, org }
}

fn identity(id: &str) -> HostIdentity {
    HostIdentity {
        id: id.to_string(),
        name: id.to_uppercase(),
        url: format!("http://{}:23000", id),
        description: None,
        aliases: Vec::new(),
    }
}

fn meta(initiator: &str, propagation_id: Option<&str>) -> PropagationMeta {
    PropagationMeta {
        initiator: initiator.to_string(),
        timestamp_ms: 1_000,
        propagation_id: propagation_id.map(str::to_string),
        propagation_depth: Some(0),
    }
}

fn register_simple(f: &Fixture, id: &str, propagation_id: Option<&str>) -> Response {
    f.service.handle_register(identity(id), meta(id, propagation_id), None, None, None)
}

async fn exchange_simple(f: &Fixture, from: &str, offered: Vec<HostIdentity>, pid: Option<&str>) -> Response {
    f.service
        .handle_exchange(identity(from), offered, pid.map(str::to_string), None, None, None)
        .await
}

// --- register ---

#[test]
fn register_from_empty_store_adds_the_peer() {
    let f = fixture();
    match register_simple(&f, "b", None) {
        Response::Registered { success, registered, already_known, host, .. } => {
            assert!(success);
            assert!(registered);
            assert!(!already_known);
            // Response carries our identity for back-registration
            assert_eq!(host.id, "a");
        }
        other => panic!("unexpected response: {:?}", other),
    }
    let b = f.hosts.get_by_id("b").unwrap();
    assert_eq!(b.kind, HostKind::Remote);
    assert_eq!(b.sync_source.as_deref(), Some("register"));
}

#[test]
fn register_replay_with_same_propagation_id_is_a_noop() {
    let f = fixture();
    register_simple(&f, "b", Some("prop-1"));

    // Same propagation id from a different hop: guaranteed no-op
    match register_simple(&f, "c", Some("prop-1")) {
        Response::Registered { registered, already_known, .. } => {
            assert!(!registered);
            assert!(already_known);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert!(f.hosts.get_by_id("c").is_none());
}

#[test]
fn register_known_peer_reports_already_known() {
    let f = fixture();
    register_simple(&f, "b", Some("prop-1"));
    match register_simple(&f, "b", Some("prop-2")) {
        Response::Registered { registered, already_known, .. } => {
            assert!(!registered);
            assert!(already_known);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(f.hosts.peers().len(), 1);
}

#[test]
fn register_self_reports_already_known() {
    let f = fixture();
    match register_simple(&f, "a", None) {
        Response::Registered { registered, already_known, .. } => {
            assert!(!registered);
            assert!(already_known);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert!(f.hosts.peers().is_empty());
}

#[test]
fn register_response_includes_entire_known_peer_list() {
    let f = fixture();
    register_simple(&f, "b", None);
    register_simple(&f, "c", None);

    match register_simple(&f, "d", None) {
        Response::Registered { known_hosts, .. } => {
            let mut ids: Vec<&str> = known_hosts.iter().map(|h| h.id.as_str()).collect();
            ids.sort_unstable();
            assert_eq!(ids, ["b", "c", "d"]);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[test]
fn register_rejects_invalid_identity_before_mutation() {
    let f = fixture();
    let mut bad = identity("b");
    bad.id = "not valid".to_string();
    match f.service.handle_register(bad, meta("b", None), None, None, None) {
        Response::Error { message } => assert!(message.contains("invalid host id")),
        other => panic!("unexpected response: {:?}", other),
    }
    assert!(f.hosts.peers().is_empty());
}

#[test]
fn register_adopts_carried_organization() {
    let f = fixture();
    let response = f.service.handle_register(
        identity("b"),
        meta("b", None),
        Some("acme".to_string()),
        Some(5_000),
        Some("b".to_string()),
    );
    match response {
        Response::Registered { organization, organization_adopted, .. } => {
            assert_eq!(organization.as_deref(), Some("acme"));
            assert_eq!(organization_adopted, Some(true));
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(f.org.get().set_by.as_deref(), Some("b"));
}

#[test]
fn register_with_conflicting_organization_is_a_conflict_not_a_registration() {
    let f = fixture();
    f.org.adopt("acme", 1_000, "a").unwrap();

    let response = f.service.handle_register(
        identity("b"),
        meta("b", None),
        Some("other-org".to_string()),
        None,
        None,
    );
    match response {
        Response::OrgConflict { current } => {
            assert_eq!(current.name.as_deref(), Some("acme"));
        }
        other => panic!("unexpected response: {:?}", other),
    }
    // The conflict happens before the peer insert
    assert!(f.hosts.get_by_id("b").is_none());
    assert_eq!(f.org.get().name.as_deref(), Some("acme"));
}

// --- exchange ---

#[tokio::test]
async fn exchange_probes_and_stores_reachable_candidates() {
    let f = fixture();
    register_simple(&f, "b", None);
    f.prober.mark_reachable("http://c:23000");

    let response =
        exchange_simple(&f, "b", vec![identity("c"), identity("ghost")], Some("prop-1")).await;
    match response {
        Response::Exchanged { success, newly_added, already_known, unreachable, .. } => {
            assert!(success, "partial success is success");
            assert_eq!(newly_added, ["c"]);
            assert!(already_known.is_empty());
            assert_eq!(unreachable, ["ghost"]);
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let c = f.hosts.get_by_id("c").unwrap();
    assert_eq!(c.sync_source.as_deref(), Some("peer-exchange:b"));
    // The unreachable host is not remembered
    assert!(f.hosts.get_by_id("ghost").is_none());
}

#[tokio::test]
async fn exchange_replay_produces_empty_delta_and_no_duplicates() {
    let f = fixture();
    register_simple(&f, "b", None);
    f.prober.mark_reachable("http://c:23000");

    exchange_simple(&f, "b", vec![identity("c")], Some("prop-1")).await;
    let replay = exchange_simple(&f, "b", vec![identity("c")], Some("prop-1")).await;

    match replay {
        Response::Exchanged { newly_added, already_known, unreachable, .. } => {
            assert!(newly_added.is_empty());
            assert!(already_known.is_empty());
            assert!(unreachable.is_empty());
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(f.hosts.peers().len(), 2);
    // The replay never re-probed anything
    assert_eq!(f.prober.probed().len(), 1);
}

#[tokio::test]
async fn exchange_skips_self_and_sender_and_dedups_by_id() {
    let f = fixture();
    register_simple(&f, "b", None);
    f.prober.mark_reachable("http://c:23000");

    let mut c_dup = identity("c");
    c_dup.url = "http://c-alt:23000".to_string();
    let response = exchange_simple(
        &f,
        "b",
        vec![identity("a"), identity("b"), identity("c"), c_dup],
        Some("prop-1"),
    )
    .await;

    match response {
        Response::Exchanged { newly_added, already_known, unreachable, .. } => {
            // First occurrence of "c" wins; self and sender are silent skips
            assert_eq!(newly_added, ["c"]);
            assert!(already_known.is_empty());
            assert!(unreachable.is_empty());
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(f.hosts.get_by_id("c").unwrap().url, "http://c:23000");
    assert_eq!(f.prober.probed(), ["http://c:23000"]);
}

#[tokio::test]
async fn exchange_classifies_known_url_under_different_id_as_already_known() {
    let f = fixture();
    register_simple(&f, "b", None);
    register_simple(&f, "b-old", None);

    let mut renamed = identity("b-new");
    renamed.url = "http://b-old:23000".to_string();
    let response = exchange_simple(&f, "b", vec![renamed], Some("prop-1")).await;

    match response {
        Response::Exchanged { newly_added, already_known, .. } => {
            assert!(newly_added.is_empty());
            assert_eq!(already_known, ["b-new"]);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    // No duplicate was inserted and nothing was probed
    assert_eq!(f.hosts.peers().len(), 2);
    assert!(f.prober.probed().is_empty());
}

#[tokio::test]
async fn exchange_skips_malformed_entries_and_processes_the_rest() {
    let f = fixture();
    register_simple(&f, "b", None);
    f.prober.mark_reachable("http://c:23000");

    let mut malformed = identity("bad host");
    malformed.url = "nonsense".to_string();
    let response = exchange_simple(&f, "b", vec![malformed, identity("c")], Some("prop-1")).await;

    match response {
        Response::Exchanged { newly_added, .. } => assert_eq!(newly_added, ["c"]),
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn exchange_org_mismatch_returns_conflict_with_current_state() {
    let f = fixture();
    f.org.adopt("acme", 1_000, "a").unwrap();

    let response = f
        .service
        .handle_exchange(
            identity("b"),
            vec![identity("c")],
            Some("prop-1".to_string()),
            Some("other-org".to_string()),
            Some(2_000),
            Some("b".to_string()),
        )
        .await;

    match response {
        Response::OrgConflict { current } => {
            assert_eq!(current.name.as_deref(), Some("acme"));
            assert_eq!(current.set_by.as_deref(), Some("a"));
        }
        other => panic!("unexpected response: {:?}", other),
    }
    // Nothing was merged
    assert!(f.hosts.get_by_id("c").is_none());
}

#[tokio::test]
async fn exchange_adopts_organization_when_unset() {
    let f = fixture();
    let response = f
        .service
        .handle_exchange(
            identity("b"),
            Vec::new(),
            None,
            Some("acme".to_string()),
            Some(7_000),
            Some("b".to_string()),
        )
        .await;

    match response {
        Response::Exchanged { organization, organization_adopted, .. } => {
            assert_eq!(organization.as_deref(), Some("acme"));
            assert_eq!(organization_adopted, Some(true));
        }
        other => panic!("unexpected response: {:?}", other),
    }

    // Re-offering the same name aligns without re-adoption
    let again = f
        .service
        .handle_exchange(
            identity("b"),
            Vec::new(),
            None,
            Some("acme".to_string()),
            None,
            None,
        )
        .await;
    match again {
        Response::Exchanged { organization_adopted, .. } => {
            assert_eq!(organization_adopted, Some(false));
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn exchange_without_propagation_id_is_processed_every_time() {
    let f = fixture();
    register_simple(&f, "b", None);
    f.prober.mark_reachable("http://c:23000");

    exchange_simple(&f, "b", vec![identity("c")], None).await;
    let second = exchange_simple(&f, "b", vec![identity("c")], None).await;

    // Second pass classifies c as known rather than replay-skipping
    match second {
        Response::Exchanged { newly_added, already_known, .. } => {
            assert!(newly_added.is_empty());
            assert_eq!(already_known, ["c"]);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(f.hosts.peers().len(), 2);
}
