// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::StoreError;
use hive_core::{AgentStatus, SessionStatus};

fn agent(id: &str, name: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        label: None,
        sessions: Vec::new(),
        host_id: "alpha".to_string(),
        status: AgentStatus::Offline,
        auto_registered: false,
        created_at_ms: 1_000,
        updated_at_ms: 1_000,
    }
}

#[test]
fn insert_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agents.json");

    {
        let registry = AgentRegistry::open(&path).unwrap();
        registry.insert(agent("web", "Web")).unwrap();
    }

    let registry = AgentRegistry::open(&path).unwrap();
    assert_eq!(registry.list().len(), 1);
    assert_eq!(registry.list()[0].name, "Web");
}

#[test]
fn name_lookup_is_case_insensitive_but_preserves_case() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AgentRegistry::open(dir.path().join("agents.json")).unwrap();
    registry.insert(agent("web", "Web")).unwrap();

    let found = registry.get_by_name("WEB").unwrap();
    assert_eq!(found.name, "Web");
}

#[test]
fn insert_rejects_duplicate_name_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AgentRegistry::open(dir.path().join("agents.json")).unwrap();
    registry.insert(agent("web", "Web")).unwrap();
    assert!(matches!(
        registry.insert(agent("web2", "WEB")),
        Err(StoreError::DuplicateId(_))
    ));
}

#[test]
fn replace_all_is_a_full_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AgentRegistry::open(dir.path().join("agents.json")).unwrap();
    registry.insert(agent("web", "Web")).unwrap();

    let mut updated = agent("web", "Web");
    updated.status = AgentStatus::Active;
    updated.sessions.push(hive_core::AgentSession {
        index: 0,
        status: SessionStatus::Online,
        working_dir: "/srv".into(),
        created_at_ms: 1,
        last_active_ms: 2,
    });
    registry.replace_all(vec![updated, agent("db", "Db")]).unwrap();

    let agents = registry.list();
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].status, AgentStatus::Active);
    assert_eq!(agents[0].sessions.len(), 1);
}
