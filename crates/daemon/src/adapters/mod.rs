// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session enumeration adapters.
//!
//! Agents run inside long-lived terminal sessions owned by an external
//! multiplexer. The reconciler only needs a snapshot of what is live
//! right now; the trait keeps that behind a seam so tests run without a
//! tmux server.

mod tmux;

pub use tmux::TmuxSessionAdapter;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// One live session as reported by the multiplexer.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSession {
    /// Raw session name, e.g. `hive-web-2`
    pub name: String,
    pub working_dir: PathBuf,
    pub created_at_ms: u64,
    pub last_active_ms: u64,
}

/// Errors from session enumeration.
#[derive(Debug, Error)]
pub enum SessionAdapterError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Snapshot source for live, host-local sessions.
#[async_trait]
pub trait SessionAdapter: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<LiveSession>, SessionAdapterError>;
}

/// Adapter for hosts without a session layer: nothing is ever live.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSessionAdapter;

impl NoOpSessionAdapter {
    pub fn new() -> Self {
        NoOpSessionAdapter
    }
}

#[async_trait]
impl SessionAdapter for NoOpSessionAdapter {
    async fn list_sessions(&self) -> Result<Vec<LiveSession>, SessionAdapterError> {
        Ok(Vec::new())
    }
}

/// Scripted adapter for tests: returns a fixed snapshot or a forced
/// enumeration failure.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeSessionAdapter {
    sessions: parking_lot::Mutex<Vec<LiveSession>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeSessionAdapter {
    pub fn new() -> Self {
        FakeSessionAdapter {
            sessions: parking_lot::Mutex::new(Vec::new()),
            fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_sessions(&self, sessions: Vec<LiveSession>) {
        *self.sessions.lock() = sessions;
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeSessionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn list_sessions(&self) -> Result<Vec<LiveSession>, SessionAdapterError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SessionAdapterError::Command {
                command: "fake".to_string(),
                stderr: "forced failure".to_string(),
            });
        }
        Ok(self.sessions.lock().clone())
    }
}
