// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query handlers.

use std::sync::Arc;

use hive_core::{epoch_ms_now, AgentStatus};
use hive_wire::{AgentSummary, DirectoryCounts, LookupResult, Query, Response};

use super::ListenCtx;
use crate::reconcile::reconcile_sessions;

pub(super) async fn handle_query(query: Query, ctx: &Arc<ListenCtx>) -> Response {
    match query {
        Query::ListHosts => Response::Hosts { hosts: ctx.sync.hosts().list() },

        Query::GetHost { id } => {
            Response::Host { host: ctx.sync.hosts().get_by_id(&id).map(Box::new) }
        }

        Query::GetOrganization => {
            Response::Organization { organization: ctx.sync.organization().get() }
        }

        Query::ListAgents => {
            // Reconcile on demand so the listing reflects live sessions
            let self_id = ctx.sync.hosts().self_host().id.clone();
            let outcome =
                reconcile_sessions(ctx.sessions.as_ref(), &ctx.registry, &self_id, epoch_ms_now())
                    .await;
            ctx.directory.rebuild_local(&outcome.agents);
            Response::Agents { agents: outcome.agents.iter().map(AgentSummary::from).collect() }
        }

        Query::LookupAgent { name } => {
            let result = match ctx.directory.lookup(&name) {
                Some(entry) => LookupResult::hit(&entry),
                None => LookupResult::miss(),
            };
            Response::Lookup { result }
        }

        Query::DirectoryEntries => {
            let entries = ctx.directory.all_entries();
            let (local, remote) = ctx.directory.counts();
            Response::Directory { entries, counts: DirectoryCounts { local, remote } }
        }
    }
}

pub(super) fn handle_status(ctx: &Arc<ListenCtx>) -> Response {
    let agents_active = ctx
        .registry
        .list()
        .iter()
        .filter(|a| a.status == AgentStatus::Active)
        .count();
    let (directory_local, directory_remote) = ctx.directory.counts();
    Response::Status {
        uptime_secs: ctx.start_time.elapsed().as_secs(),
        hosts_known: ctx.sync.hosts().list().len(),
        agents_active,
        directory_local,
        directory_remote,
    }
}
