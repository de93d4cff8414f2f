// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session reconciliation.
//!
//! Merges the live session snapshot with the persisted agent registry
//! into the canonical per-host view of which agents are online. Live
//! slots overlay persisted ones; a slot that is no longer live flips to
//! offline but keeps its history. A live session whose parsed name
//! matches no agent becomes one — orphan adoption.
//!
//! A failed enumeration degrades to "everyone appears offline except
//! what the registry last recorded"; it never aborts the pass.

use std::collections::BTreeMap;

use hive_core::{parse_session_name, Agent, AgentSession, AgentStatus, SessionStatus};
use hive_storage::AgentRegistry;
use tracing::{debug, info, warn};

use crate::adapters::{LiveSession, SessionAdapter};

/// Result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The full agent set in presentation order: online before offline,
    /// then case-insensitive name
    pub agents: Vec<Agent>,
    /// Hive-owned live sessions discovered this pass
    pub discovered: usize,
    /// Agents auto-registered from unmatched sessions this pass
    pub adopted: usize,
}

/// One discovered slot group: display name plus slot index → session.
struct SessionGroup {
    display_name: String,
    slots: BTreeMap<u32, LiveSession>,
}

/// Run one reconciliation pass and persist the updated registry.
///
/// `now_ms` stamps every updated record, so a pass over fixed inputs is
/// deterministic.
pub async fn reconcile_sessions(
    adapter: &dyn SessionAdapter,
    registry: &AgentRegistry,
    self_host_id: &str,
    now_ms: u64,
) -> ReconcileOutcome {
    let live = match adapter.list_sessions().await {
        Ok(sessions) => sessions,
        Err(e) => {
            warn!(error = %e, "session enumeration failed, treating all sessions as offline");
            Vec::new()
        }
    };

    let mut groups = group_sessions(&live);
    let discovered = groups.values().map(|g| g.slots.len()).sum();

    // Overlay discovered slots onto every known agent
    let mut agents: Vec<Agent> = registry
        .list()
        .into_iter()
        .map(|agent| {
            let group = groups.remove(&agent.name.to_lowercase());
            overlay(agent, group, now_ms)
        })
        .collect();

    // Whatever is left matched no agent: adopt as new agents
    let mut adopted = 0;
    for (lower, group) in groups {
        debug!(agent = %group.display_name, slots = group.slots.len(), "adopting orphan sessions");
        agents.push(adopt_orphan(lower, group, self_host_id, now_ms));
        adopted += 1;
    }

    agents.sort_by(|a, b| {
        let rank = |agent: &Agent| match agent.status {
            AgentStatus::Active => 0,
            AgentStatus::Offline => 1,
        };
        rank(a).cmp(&rank(b)).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    if adopted > 0 {
        info!(adopted, "auto-registered agents from live sessions");
    }

    // One persisted write per pass, regardless of how much changed
    if let Err(e) = registry.replace_all(agents.clone()) {
        warn!(error = %e, "could not persist reconciled agent registry");
    }

    ReconcileOutcome { agents, discovered, adopted }
}

/// Group live sessions by lower-cased agent name. Foreign session names
/// are ignored. First occurrence of a name fixes the display casing.
fn group_sessions(live: &[LiveSession]) -> BTreeMap<String, SessionGroup> {
    let mut groups: BTreeMap<String, SessionGroup> = BTreeMap::new();
    for session in live {
        let Some((name, index)) = parse_session_name(&session.name) else {
            continue;
        };
        let group = groups
            .entry(name.to_lowercase())
            .or_insert_with(|| SessionGroup { display_name: name, slots: BTreeMap::new() });
        group.slots.entry(index).or_insert_with(|| session.clone());
    }
    groups
}

/// Overlay a discovered slot group onto a persisted agent. Slots not
/// discovered this pass are forced offline; nothing is deleted.
fn overlay(mut agent: Agent, group: Option<SessionGroup>, now_ms: u64) -> Agent {
    let mut live_slots = group.map(|g| g.slots).unwrap_or_default();

    let mut sessions: Vec<AgentSession> = agent
        .sessions
        .iter()
        .map(|known| match live_slots.remove(&known.index) {
            Some(live) => AgentSession {
                index: known.index,
                status: SessionStatus::Online,
                working_dir: live.working_dir,
                created_at_ms: known.created_at_ms,
                last_active_ms: live.last_active_ms,
            },
            None => AgentSession { status: SessionStatus::Offline, ..known.clone() },
        })
        .collect();

    // Slots seen live but never recorded before
    for (index, live) in live_slots {
        sessions.push(AgentSession {
            index,
            status: SessionStatus::Online,
            working_dir: live.working_dir,
            created_at_ms: live.created_at_ms,
            last_active_ms: live.last_active_ms,
        });
    }

    sessions.sort_by_key(|s| s.index);
    agent.sessions = sessions;
    agent.status = agent.derived_status();
    agent.updated_at_ms = now_ms;
    agent
}

fn adopt_orphan(lower: String, group: SessionGroup, self_host_id: &str, now_ms: u64) -> Agent {
    let created_at_ms =
        group.slots.values().map(|s| s.created_at_ms).min().unwrap_or(now_ms);
    let sessions: Vec<AgentSession> = group
        .slots
        .into_iter()
        .map(|(index, live)| AgentSession {
            index,
            status: SessionStatus::Online,
            working_dir: live.working_dir,
            created_at_ms: live.created_at_ms,
            last_active_ms: live.last_active_ms,
        })
        .collect();

    Agent {
        id: lower,
        name: group.display_name,
        label: None,
        sessions,
        host_id: self_host_id.to_string(),
        status: AgentStatus::Active,
        auto_registered: true,
        created_at_ms,
        updated_at_ms: now_ms,
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
