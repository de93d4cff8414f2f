// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer-facing directory surface.

use std::sync::Arc;

use hive_core::epoch_ms_now;
use hive_wire::{DirectoryCounts, Response};

use super::ListenCtx;
use crate::reconcile::reconcile_sessions;

/// Serve this host's local agent-location entries.
///
/// Reconciles first so the entries reflect what is live right now — the
/// rebuild strictly follows the reconciliation pass that precedes it.
pub(super) async fn handle_pull_directory(ctx: &Arc<ListenCtx>) -> Response {
    let self_id = ctx.sync.hosts().self_host().id.clone();
    let outcome =
        reconcile_sessions(ctx.sessions.as_ref(), &ctx.registry, &self_id, epoch_ms_now()).await;
    ctx.directory.rebuild_local(&outcome.agents);

    let entries = ctx.directory.local_entries();
    let (local, remote) = ctx.directory.counts();
    Response::Directory { entries, counts: DirectoryCounts { local, remote } }
}
