// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive agents` / `hive lookup` / `hive directory` - Agent surfaces

use anyhow::{anyhow, Result};
use hive_daemon::{Query, Request, Response};

use crate::client::DaemonClient;
use crate::output::{format_or_json, format_time_ago, print_table, OutputFormat};

pub async fn agents(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    match client.send(&Request::Query { query: Query::ListAgents }).await? {
        Response::Agents { agents } => format_or_json(format, &agents, || {
            let rows: Vec<Vec<String>> = agents
                .iter()
                .map(|a| {
                    vec![
                        a.name.clone(),
                        a.status.clone(),
                        format!("{}/{}", a.online, a.sessions),
                        a.host_id.clone(),
                        if a.auto_registered { "auto".to_string() } else { "-".to_string() },
                        format_time_ago(a.updated_at_ms),
                    ]
                })
                .collect();
            print_table(&["NAME", "STATUS", "ONLINE", "HOST", "REGISTERED", "UPDATED"], &rows);
        }),
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

pub async fn lookup(name: String, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    match client.send(&Request::Query { query: Query::LookupAgent { name: name.clone() } }).await? {
        Response::Lookup { result } => {
            if !result.found {
                return Err(anyhow!("no agent named {:?} in the directory", name));
            }
            format_or_json(format, &result, || {
                println!(
                    "{} @ {} ({})",
                    result.name.clone().unwrap_or_default(),
                    result.host_id.clone().unwrap_or_default(),
                    result.host_url.clone().unwrap_or_else(|| "no url".to_string()),
                );
                if let Some(address) = &result.amp_address {
                    println!("Address: {}", address);
                }
                println!(
                    "Source: {} (seen {} ago)",
                    result.source.clone().unwrap_or_default(),
                    format_time_ago(result.last_seen_ms.unwrap_or(0)),
                );
            })
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

pub async fn directory(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    match client.send(&Request::Query { query: Query::DirectoryEntries }).await? {
        Response::Directory { entries, counts } => {
            let obj = serde_json::json!({ "entries": entries, "counts": counts });
            format_or_json(format, &obj, || {
                let rows: Vec<Vec<String>> = entries
                    .iter()
                    .map(|e| {
                        vec![
                            e.name.clone(),
                            e.host_id.clone(),
                            e.source.to_string(),
                            format_time_ago(e.last_seen_ms),
                        ]
                    })
                    .collect();
                print_table(&["NAME", "HOST", "SOURCE", "SEEN"], &rows);
                println!();
                println!("{} local, {} remote", counts.local, counts.remote);
            })
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}
