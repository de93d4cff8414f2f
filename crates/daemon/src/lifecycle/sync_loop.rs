// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic sync loop.
//!
//! Each pass reconciles live sessions, rebuilds the local directory, and
//! syncs with every enabled peer: push our known-host list, pull their
//! directory entries. Per-peer failures are logged and the peer stays
//! known — partitions are expected to heal, and the next pass is the
//! retry cadence.

use std::sync::Arc;
use std::time::Duration;

use hive_core::epoch_ms_now;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::listener::ListenCtx;
use crate::reconcile::reconcile_sessions;

pub(crate) async fn run_sync_loop(
    ctx: Arc<ListenCtx>,
    interval: Duration,
    cancel: CancellationToken,
) {
    info!(interval_secs = interval.as_secs(), "sync loop running");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("sync loop stopped");
                return;
            }
            _ = tokio::time::sleep(interval) => sync_pass(&ctx).await,
        }
    }
}

/// One full pass: reconcile, rebuild, sync peers.
pub(crate) async fn sync_pass(ctx: &Arc<ListenCtx>) {
    let self_id = ctx.sync.hosts().self_host().id.clone();
    let outcome =
        reconcile_sessions(ctx.sessions.as_ref(), &ctx.registry, &self_id, epoch_ms_now()).await;
    ctx.directory.rebuild_local(&outcome.agents);
    debug!(
        agents = outcome.agents.len(),
        discovered = outcome.discovered,
        adopted = outcome.adopted,
        "reconciled sessions"
    );

    // One propagation id per pass: the pass is one logical gossip event,
    // so a host hearing it twice (directly and relayed) processes it once.
    let propagation_id = uuid::Uuid::new_v4().to_string();
    for host in ctx.sync.hosts().peers().into_iter().filter(|h| h.enabled) {
        match ctx.sync.sync_with_peer(&ctx.client, &host, &ctx.directory, &propagation_id).await {
            Ok(merged) => debug!(host = %host.id, merged, "peer sync ok"),
            Err(e) => warn!(host = %host.id, error = %e, "peer sync failed"),
        }
    }
}
