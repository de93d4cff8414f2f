// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent records and session slots.
//!
//! An `Agent` is a durable identity on one host; its `sessions` are the
//! per-slot runtime state discovered from the live session layer (tmux).
//! Reconciliation overlays live slots onto persisted ones — absence of a
//! live session flips status, it never removes history.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Live sessions owned by hive are named `hive-<agent>` or `hive-<agent>-<slot>`.
pub const SESSION_PREFIX: &str = "hive-";

/// Agent status derived from its session slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// At least one session slot is online
    Active,
    Offline,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Status of a single session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Online,
    Offline,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// One session slot of an agent. At most one per `(agent, index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSession {
    pub index: u32,
    pub status: SessionStatus,
    pub working_dir: PathBuf,
    pub created_at_ms: u64,
    pub last_active_ms: u64,
}

/// A durable agent identity on one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    /// Durable identity; matching against live sessions is case-insensitive,
    /// stored identity preserves the original case
    pub name: String,
    /// Optional routing address on the messaging fabric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordered by `index`, indices unique within the agent
    pub sessions: Vec<AgentSession>,
    pub host_id: String,
    pub status: AgentStatus,
    /// Set when the agent was synthesized from an unmatched live session
    #[serde(default)]
    pub auto_registered: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Agent {
    /// Recompute status from session slots: active iff any slot is online.
    pub fn derived_status(&self) -> AgentStatus {
        if self.sessions.iter().any(|s| s.status == SessionStatus::Online) {
            AgentStatus::Active
        } else {
            AgentStatus::Offline
        }
    }

    pub fn online_sessions(&self) -> usize {
        self.sessions.iter().filter(|s| s.status == SessionStatus::Online).count()
    }
}

/// Parse a live session name into `(agent_name, slot_index)`.
///
/// `hive-web` → `("web", 0)`, `hive-web-2` → `("web", 2)`. Names without
/// the hive prefix belong to someone else and return `None`. A bare
/// trailing `-<digits>` group is always the slot index, so an agent whose
/// display name ends in digits is addressed through its label instead.
pub fn parse_session_name(session: &str) -> Option<(String, u32)> {
    let rest = session.strip_prefix(SESSION_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    if let Some((base, digits)) = rest.rsplit_once('-') {
        if !base.is_empty() && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = digits.parse::<u32>() {
                return Some((base.to_string(), index));
            }
        }
    }
    Some((rest.to_string(), 0))
}

/// Compose the session name for an agent slot. Inverse of
/// [`parse_session_name`] for slot 0 and positive slots.
pub fn session_name(agent_name: &str, index: u32) -> String {
    if index == 0 {
        format!("{}{}", SESSION_PREFIX, agent_name)
    } else {
        format!("{}{}-{}", SESSION_PREFIX, agent_name, index)
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
