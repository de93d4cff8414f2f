// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host and organization mutation handlers (local CLI only).

use std::sync::Arc;

use hive_core::epoch_ms_now;
use hive_storage::HostUpdate;
use hive_wire::{HostIdentity, HostPatch, Response};
use tracing::{info, warn};

use super::ListenCtx;
use crate::sync::SyncError;

/// Add a peer and run the full join flow: register against it, merge its
/// bootstrap list, gossip the newcomer to the rest of the mesh.
pub(super) async fn handle_host_add(host: HostIdentity, ctx: &Arc<ListenCtx>) -> Response {
    match ctx.sync.join_peer(&ctx.client, host).await {
        Ok(response) => response,
        Err(SyncError::OrganizationMismatch { current }) => Response::OrgConflict { current },
        Err(e) => Response::error(e),
    }
}

pub(super) fn handle_host_update(id: String, patch: HostPatch, ctx: &Arc<ListenCtx>) -> Response {
    let update = HostUpdate {
        name: patch.name,
        url: patch.url,
        description: patch.description,
        enabled: patch.enabled,
    };
    match ctx.sync.hosts().update(&id, update) {
        Ok(host) => Response::Host { host: Some(Box::new(host)) },
        Err(e) => Response::error(e),
    }
}

pub(super) fn handle_host_remove(id: String, ctx: &Arc<ListenCtx>) -> Response {
    match ctx.sync.hosts().remove(&id) {
        Ok(host) => {
            let dropped = ctx.directory.drop_host(&host.id);
            info!(host = %host.id, directory_entries = dropped, "removed host");
            Response::Ok
        }
        Err(e) => Response::error(e),
    }
}

/// Sync one enabled peer, or all of them. Per-peer failures are
/// reported, not raised — partial success is the normal case.
pub(super) async fn handle_host_sync(id: Option<String>, ctx: &Arc<ListenCtx>) -> Response {
    let targets = match id {
        Some(id) => match ctx.sync.hosts().get_by_id(&id) {
            Some(host) if host.is_local() => {
                return Response::error("cannot sync with the local host")
            }
            Some(host) => vec![host],
            None => return Response::error(format!("unknown host {:?}", id)),
        },
        None => ctx.sync.hosts().peers().into_iter().filter(|h| h.enabled).collect(),
    };

    let propagation_id = uuid::Uuid::new_v4().to_string();
    let mut synced = Vec::new();
    let mut failed = Vec::new();
    for host in targets {
        match ctx.sync.sync_with_peer(&ctx.client, &host, &ctx.directory, &propagation_id).await {
            Ok(merged) => {
                info!(host = %host.id, merged, "synced with peer");
                synced.push(host.id);
            }
            Err(e) => {
                warn!(host = %host.id, error = %e, "sync failed");
                failed.push(host.id);
            }
        }
    }
    Response::Synced { synced, failed }
}

/// Claim the organization name from this host and gossip the claim.
pub(super) fn handle_org_set(name: String, ctx: &Arc<ListenCtx>) -> Response {
    let self_id = ctx.sync.hosts().self_host().id.clone();
    match ctx.sync.organization().adopt(&name, epoch_ms_now(), &self_id) {
        Ok(_) => {
            ctx.sync.broadcast_exchange(
                ctx.client.clone(),
                uuid::Uuid::new_v4().to_string(),
                &[],
            );
            Response::Organization { organization: ctx.sync.organization().get() }
        }
        Err(hive_storage::OrganizationError::Mismatch { current, .. }) => {
            Response::OrgConflict { current }
        }
        Err(e) => Response::error(e),
    }
}
