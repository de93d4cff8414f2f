// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-daemon: the mesh daemon.
//!
//! Runs the peer-sync protocol (host discovery via register/exchange
//! gossip), reconciles live sessions against the agent registry, and
//! serves the agent directory to the CLI (Unix socket) and to peer
//! hosts (TCP).

pub mod adapters;
pub mod directory;
pub mod env;
pub mod lifecycle;
mod listener;
pub mod propagation;
pub mod reconcile;
pub mod sync;

pub use adapters::{LiveSession, NoOpSessionAdapter, SessionAdapter, TmuxSessionAdapter};
pub use directory::AgentDirectory;
pub use propagation::PropagationTracker;
pub use reconcile::{reconcile_sessions, ReconcileOutcome};
pub use sync::{PeerClient, Prober, SyncError, SyncService, TcpProber};

#[cfg(any(test, feature = "test-support"))]
pub use adapters::FakeSessionAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use sync::FakeProber;

// Re-exported for `crates/cli`
pub use hive_wire::{
    read_response, write_request, AgentSummary, DirectoryCounts, HostIdentity, HostPatch,
    LookupResult, ProtocolError, Query, Request, Response,
};
