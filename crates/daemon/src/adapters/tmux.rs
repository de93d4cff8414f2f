// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux-backed session enumeration.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

use super::{LiveSession, SessionAdapter, SessionAdapterError};

const LIST_FORMAT: &str =
    "#{session_name}\t#{session_path}\t#{session_created}\t#{session_activity}";

/// Enumerates live sessions from the local tmux server.
#[derive(Debug, Clone, Copy, Default)]
pub struct TmuxSessionAdapter;

impl TmuxSessionAdapter {
    pub fn new() -> Self {
        TmuxSessionAdapter
    }
}

#[async_trait]
impl SessionAdapter for TmuxSessionAdapter {
    async fn list_sessions(&self) -> Result<Vec<LiveSession>, SessionAdapterError> {
        let output = tokio::process::Command::new("tmux")
            .args(["list-sessions", "-F", LIST_FORMAT])
            .output()
            .await
            .map_err(|e| SessionAdapterError::Spawn {
                command: "tmux list-sessions".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // No server means no sessions, not a broken enumeration
            if stderr.contains("no server running") || stderr.contains("No such file or directory")
            {
                return Ok(Vec::new());
            }
            return Err(SessionAdapterError::Command {
                command: "tmux list-sessions".to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().filter_map(parse_line).collect())
    }
}

/// Parse one `list-sessions` line. A malformed line is logged and
/// skipped; it must not abort the rest of the snapshot.
fn parse_line(line: &str) -> Option<LiveSession> {
    let mut fields = line.split('\t');
    let (name, path, created, activity) =
        (fields.next()?, fields.next()?, fields.next()?, fields.next()?);

    let created_s: u64 = match created.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(line, "unparseable tmux session line, skipping");
            return None;
        }
    };
    let activity_s: u64 = match activity.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(line, "unparseable tmux session line, skipping");
            return None;
        }
    };

    Some(LiveSession {
        name: name.to_string(),
        working_dir: PathBuf::from(path),
        created_at_ms: created_s * 1_000,
        last_active_ms: activity_s * 1_000,
    })
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
