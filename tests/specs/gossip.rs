// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-host gossip specs: registration bootstrap, exchange
//! convergence, idempotent replay, conflict detection.

use super::prelude::*;
use hive_wire::{PropagationMeta, Response};

fn meta(initiator: &str, propagation_id: &str) -> PropagationMeta {
    PropagationMeta {
        initiator: initiator.to_string(),
        timestamp_ms: 1_000,
        propagation_id: Some(propagation_id.to_string()),
        propagation_depth: Some(0),
    }
}

/// Simulate "B registers itself with A", then apply A's bootstrap
/// response on B the way the join flow does: store the responder
/// directly, merge its known list through the verified path.
async fn register_and_backfill(a: &TestHost, b: &TestHost, propagation_id: &str) {
    let response =
        a.service.handle_register(b.identity(), meta(&b.id, propagation_id), None, None, None);
    let Response::Registered { success: true, host, known_hosts, .. } = response else {
        panic!("registration failed: {:?}", response);
    };

    // The responder just answered, so it is reachable by definition
    b.hosts
        .add_if_absent(hive_core::Host::remote(&host.id, &host.name, &host.url, "register"))
        .unwrap();

    for identity in &known_hosts {
        b.prober.mark_reachable(&identity.url);
    }
    let response = b.service.handle_exchange(a.identity(), known_hosts, None, None, None, None).await;
    assert!(matches!(response, Response::Exchanged { success: true, .. }));
}

#[tokio::test]
async fn register_makes_two_empty_hosts_mutually_known() {
    let a = TestHost::new("a");
    let b = TestHost::new("b");

    register_and_backfill(&a, &b, "join-b").await;

    assert!(a.knows("b"), "A learned B from the registration");
    assert!(b.knows("a"), "B learned A from the response");
}

#[tokio::test]
async fn three_hosts_converge_transitively() {
    let a = TestHost::new("a");
    let b = TestHost::new("b");
    let c = TestHost::new("c");

    // A knows B, B knows C
    register_and_backfill(&a, &b, "join-b").await;
    register_and_backfill(&b, &c, "join-c").await;
    assert!(!a.knows("c"));

    // B's periodic exchange towards A carries C's identity
    a.prober.mark_reachable(&url_of("c"));
    let response = a
        .service
        .handle_exchange(
            b.identity(),
            b.known_identities(),
            Some("b-pass-1".to_string()),
            None,
            None,
            None,
        )
        .await;

    match response {
        Response::Exchanged { newly_added, .. } => assert_eq!(newly_added, vec!["c"]),
        other => panic!("unexpected response: {:?}", other),
    }
    for id in ["a", "b", "c"] {
        assert!(a.knows(id) || id == "a", "A's store must cover {}", id);
    }
    assert!(a.hosts.get_by_id("c").is_some());
}

#[tokio::test]
async fn replayed_exchange_is_an_empty_delta_everywhere() {
    let a = TestHost::new("a");
    let b = TestHost::new("b");
    let c = TestHost::new("c");

    register_and_backfill(&a, &b, "join-b").await;
    register_and_backfill(&b, &c, "join-c").await;
    a.prober.mark_reachable(&url_of("c"));

    let offered = b.known_identities();
    let first = a
        .service
        .handle_exchange(b.identity(), offered.clone(), Some("pass".to_string()), None, None, None)
        .await;
    let Response::Exchanged { newly_added, .. } = first else { panic!("exchange failed") };
    assert_eq!(newly_added, vec!["c"]);

    // Same propagation id arriving again — e.g. relayed around the mesh
    let replay = a
        .service
        .handle_exchange(b.identity(), offered, Some("pass".to_string()), None, None, None)
        .await;
    match replay {
        Response::Exchanged { newly_added, already_known, unreachable, .. } => {
            assert!(newly_added.is_empty());
            assert!(already_known.is_empty());
            assert!(unreachable.is_empty());
        }
        other => panic!("unexpected response: {:?}", other),
    }
    // And no duplicates were stored
    assert_eq!(a.hosts.peers().len(), 2);
}

#[tokio::test]
async fn unreachable_hosts_are_reported_and_never_stored() {
    let a = TestHost::new("a");
    let b = TestHost::new("b");
    register_and_backfill(&a, &b, "join-b").await;

    // B offers a host that does not answer probes
    let ghost = hive_wire::HostIdentity {
        id: "ghost".to_string(),
        name: "GHOST".to_string(),
        url: url_of("ghost"),
        description: None,
        aliases: Vec::new(),
    };
    let response = a
        .service
        .handle_exchange(b.identity(), vec![ghost], Some("pass".to_string()), None, None, None)
        .await;

    match response {
        Response::Exchanged { success, newly_added, unreachable, .. } => {
            assert!(success, "partial success is still success");
            assert!(newly_added.is_empty());
            assert_eq!(unreachable, vec!["ghost"]);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert!(!a.knows("ghost"));
}

#[tokio::test]
async fn same_url_under_new_id_is_not_duplicated() {
    let a = TestHost::new("a");
    let b = TestHost::new("b");
    register_and_backfill(&a, &b, "join-b").await;

    // A knows the host at url_of("b") as "b"; an exchange offers it as "b-new"
    let renamed = hive_wire::HostIdentity {
        id: "b-new".to_string(),
        name: "B".to_string(),
        url: url_of("b"),
        description: None,
        aliases: Vec::new(),
    };
    let c = TestHost::new("c");
    a.hosts.add(hive_core::Host::remote("c", "C", url_of("c"), "manual")).unwrap();
    let response = a
        .service
        .handle_exchange(c.identity(), vec![renamed], Some("pass".to_string()), None, None, None)
        .await;

    match response {
        Response::Exchanged { newly_added, already_known, .. } => {
            assert!(newly_added.is_empty());
            assert_eq!(already_known, vec!["b-new"]);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert!(a.knows("b"));
    assert!(!a.knows("b-new"));
}

#[tokio::test]
async fn organization_spreads_by_adoption_and_conflicts_are_detected() {
    let a = TestHost::new("a");
    let b = TestHost::new("b");
    let c = TestHost::new("c");

    a.org.adopt("acme", 1_000, "a").unwrap();

    // A's exchange towards B carries the claim; B has none and adopts it
    let response = b
        .service
        .handle_exchange(
            a.identity(),
            Vec::new(),
            Some("org-pass".to_string()),
            Some("acme".to_string()),
            Some(1_000),
            Some("a".to_string()),
        )
        .await;
    match response {
        Response::Exchanged { organization_adopted, .. } => {
            assert_eq!(organization_adopted, Some(true));
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(b.org.get().name.as_deref(), Some("acme"));
    assert_eq!(b.org.get().set_by.as_deref(), Some("a"));

    // C independently claimed another name; the same exchange conflicts
    c.org.adopt("globex", 500, "c").unwrap();
    let response = c
        .service
        .handle_exchange(
            a.identity(),
            Vec::new(),
            Some("org-pass-2".to_string()),
            Some("acme".to_string()),
            Some(1_000),
            Some("a".to_string()),
        )
        .await;
    match response {
        Response::OrgConflict { current } => {
            assert_eq!(current.name.as_deref(), Some("globex"));
        }
        other => panic!("unexpected response: {:?}", other),
    }
    // Detection never mutates: C keeps its claim
    assert_eq!(c.org.get().name.as_deref(), Some("globex"));
}
