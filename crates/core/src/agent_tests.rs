// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    plain = { "hive-web", "web", 0 },
    slot = { "hive-web-2", "web", 2 },
    multi_dash = { "hive-data-loader-3", "data-loader", 3 },
    zero_slot = { "hive-web-0", "web", 0 },
    big_slot = { "hive-w-10", "w", 10 },
)]
fn parses_owned_session_names(session: &str, name: &str, index: u32) {
    assert_eq!(parse_session_name(session), Some((name.to_string(), index)));
}

#[parameterized(
    foreign = { "scratch" },
    other_prefix = { "tmux-web" },
    bare_prefix = { "hive-" },
)]
fn rejects_foreign_session_names(session: &str) {
    assert_eq!(parse_session_name(session), None);
}

#[test]
fn digits_only_name_is_the_agent_not_a_slot() {
    // "hive-7" has no base before the dash group, so the whole remainder
    // is the agent name.
    assert_eq!(parse_session_name("hive-7"), Some(("7".to_string(), 0)));
}

#[test]
fn slot_index_does_not_parse_past_u32() {
    // Overflowing digit runs fall through to "whole remainder is the name".
    assert_eq!(
        parse_session_name("hive-web-99999999999"),
        Some(("web-99999999999".to_string(), 0))
    );
}

#[parameterized(
    slot_zero = { "web", 0, "hive-web" },
    slot_two = { "web", 2, "hive-web-2" },
)]
fn session_name_round_trips(name: &str, index: u32, expected: &str) {
    let session = session_name(name, index);
    assert_eq!(session, expected);
    assert_eq!(parse_session_name(&session), Some((name.to_string(), index)));
}

fn session(index: u32, status: SessionStatus) -> AgentSession {
    AgentSession {
        index,
        status,
        working_dir: "/work".into(),
        created_at_ms: 1_000,
        last_active_ms: 2_000,
    }
}

#[test]
fn derived_status_active_iff_any_slot_online() {
    let mut agent = Agent {
        id: "web".to_string(),
        name: "Web".to_string(),
        label: None,
        sessions: vec![session(0, SessionStatus::Offline), session(1, SessionStatus::Online)],
        host_id: "a".to_string(),
        status: AgentStatus::Offline,
        auto_registered: false,
        created_at_ms: 0,
        updated_at_ms: 0,
    };
    assert_eq!(agent.derived_status(), AgentStatus::Active);
    assert_eq!(agent.online_sessions(), 1);

    agent.sessions[1].status = SessionStatus::Offline;
    assert_eq!(agent.derived_status(), AgentStatus::Offline);
    assert_eq!(agent.online_sessions(), 0);
}
