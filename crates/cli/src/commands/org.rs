// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive org` - Mesh organization name

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use hive_daemon::{Query, Request, Response};

use crate::client::DaemonClient;
use crate::output::{format_or_json, format_time_ago, OutputFormat};

#[derive(Args)]
pub struct OrgArgs {
    #[command(subcommand)]
    pub command: OrgCommand,
}

#[derive(Subcommand)]
pub enum OrgCommand {
    /// Show the organization this mesh belongs to
    Get,
    /// Claim the organization name (first host to set it wins)
    Set { name: String },
}

pub async fn org(args: OrgArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    match args.command {
        OrgCommand::Get => get(&client, format).await,
        OrgCommand::Set { name } => set(&client, name, format).await,
    }
}

async fn get(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match client.send(&Request::Query { query: Query::GetOrganization }).await? {
        Response::Organization { organization } => {
            format_or_json(format, &organization, || match &organization.name {
                Some(name) => {
                    println!("Organization: {}", name);
                    if let Some(set_by) = &organization.set_by {
                        println!(
                            "Set by {} ({} ago)",
                            set_by,
                            format_time_ago(organization.set_at_ms.unwrap_or(0))
                        );
                    }
                }
                None => println!("No organization set"),
            })
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

async fn set(client: &DaemonClient, name: String, format: OutputFormat) -> Result<()> {
    match client.send(&Request::OrgSet { name }).await? {
        Response::Organization { organization } => format_or_json(format, &organization, || {
            println!("Organization: {}", organization.name.clone().unwrap_or_default());
        }),
        Response::OrgConflict { current } => Err(anyhow!(
            "organization already set to {:?} by {} — conflicts are not auto-resolved",
            current.name.unwrap_or_default(),
            current.set_by.unwrap_or_default()
        )),
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}
