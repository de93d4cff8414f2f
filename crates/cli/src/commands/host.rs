// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive host` - Manage the known-host table

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use hive_daemon::{HostIdentity, HostPatch, Query, Request, Response};

use crate::client::DaemonClient;
use crate::output::{format_or_json, format_time_ago, print_table, OutputFormat};

#[derive(Args)]
pub struct HostArgs {
    #[command(subcommand)]
    pub command: HostCommand,
}

#[derive(Subcommand)]
pub enum HostCommand {
    /// Add a peer host and join it to the mesh
    Add {
        /// Mesh-unique host id
        id: String,
        /// Url the peer's daemon listens on, e.g. http://build-2:23000
        url: String,
        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,
        /// Description shown in listings
        #[arg(long)]
        description: Option<String>,
    },
    /// List known hosts
    List,
    /// Remove a host and its directory entries
    Remove { id: String },
    /// Sync now with one host, or all enabled hosts
    Sync { id: Option<String> },
    /// Re-enable a disabled host
    Enable { id: String },
    /// Keep a host but skip it during sync
    Disable { id: String },
}

pub async fn host(args: HostArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    match args.command {
        HostCommand::Add { id, url, name, description } => {
            add(&client, id, url, name, description, format).await
        }
        HostCommand::List => list(&client, format).await,
        HostCommand::Remove { id } => remove(&client, id).await,
        HostCommand::Sync { id } => sync(&client, id, format).await,
        HostCommand::Enable { id } => set_enabled(&client, id, true).await,
        HostCommand::Disable { id } => set_enabled(&client, id, false).await,
    }
}

async fn add(
    client: &DaemonClient,
    id: String,
    url: String,
    name: Option<String>,
    description: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let host = HostIdentity {
        name: name.unwrap_or_else(|| id.clone()),
        id,
        url,
        description,
        aliases: Vec::new(),
    };
    match client.send(&Request::HostAdd { host }).await? {
        Response::Registered { registered, already_known, host, known_hosts, .. } => {
            let obj = serde_json::json!({
                "registered": registered,
                "already_known": already_known,
                "host": host,
                "known_hosts": known_hosts.len(),
            });
            format_or_json(format, &obj, || {
                if registered {
                    println!("Added host {} ({})", host.id, host.url);
                } else if already_known {
                    println!("Host {} already known", host.id);
                }
            })
        }
        Response::OrgConflict { current } => Err(anyhow!(
            "organization conflict: the peer belongs to {:?}",
            current.name.unwrap_or_default()
        )),
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

async fn list(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match client.send(&Request::Query { query: Query::ListHosts }).await? {
        Response::Hosts { hosts } => format_or_json(format, &hosts, || {
            let rows: Vec<Vec<String>> = hosts
                .iter()
                .map(|h| {
                    vec![
                        h.id.clone(),
                        h.kind.to_string(),
                        h.url.clone(),
                        if h.enabled { "yes".to_string() } else { "no".to_string() },
                        format_time_ago(h.synced_at_ms.unwrap_or(0)),
                        h.sync_source.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect();
            print_table(&["ID", "KIND", "URL", "ENABLED", "SYNCED", "SOURCE"], &rows);
        }),
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

async fn remove(client: &DaemonClient, id: String) -> Result<()> {
    match client.send(&Request::HostRemove { id: id.clone() }).await? {
        Response::Ok => {
            println!("Removed host {}", id);
            Ok(())
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

async fn sync(client: &DaemonClient, id: Option<String>, format: OutputFormat) -> Result<()> {
    match client.send(&Request::HostSync { id }).await? {
        Response::Synced { synced, failed } => {
            let obj = serde_json::json!({ "synced": synced, "failed": failed });
            format_or_json(format, &obj, || {
                for id in &synced {
                    println!("Synced {}", id);
                }
                for id in &failed {
                    println!("Failed {}", id);
                }
                if synced.is_empty() && failed.is_empty() {
                    println!("No enabled hosts to sync");
                }
            })
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

async fn set_enabled(client: &DaemonClient, id: String, enabled: bool) -> Result<()> {
    let patch = HostPatch { enabled: Some(enabled), ..Default::default() };
    match client.send(&Request::HostUpdate { id, patch }).await? {
        Response::Host { host: Some(host) } => {
            println!("Host {} {}", host.id, if host.enabled { "enabled" } else { "disabled" });
            Ok(())
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}
