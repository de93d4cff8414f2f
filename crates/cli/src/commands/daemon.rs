// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive daemon` - Daemon management commands

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use hive_daemon::{Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::output::{format_or_json, format_elapsed, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check daemon status
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground).await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Status => status(format).await,
    }
}

async fn start(foreground: bool) -> Result<()> {
    let hived_path = find_hived_binary()?;

    if foreground {
        let status = std::process::Command::new(&hived_path).status()?;
        if !status.success() {
            return Err(anyhow!("daemon exited with status: {}", status));
        }
        return Ok(());
    }

    // Already running?
    let client = DaemonClient::connect()?;
    if client.ping().await.is_ok() {
        println!("Daemon already running");
        return Ok(());
    }

    std::process::Command::new(&hived_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;

    // Wait for the socket to come up
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if client.ping().await.is_ok() {
            println!("Daemon started");
            return Ok(());
        }
    }
    Err(anyhow!("daemon did not come up within 5s (see daemon.log)"))
}

async fn stop() -> Result<()> {
    let client = DaemonClient::connect()?;
    match client.shutdown().await {
        Ok(()) => {
            println!("Daemon stopped");
            Ok(())
        }
        Err(ClientError::NotRunning) => {
            println!("Daemon not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("failed to stop daemon: {}", e)),
    }
}

pub async fn status(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let response = match client.send(&Request::Status).await {
        Ok(response) => response,
        Err(ClientError::NotRunning) => {
            let obj = serde_json::json!({ "status": "stopped" });
            return format_or_json(format, &obj, || println!("Status: stopped"));
        }
        Err(e) => return Err(e.into()),
    };

    match response {
        Response::Status {
            uptime_secs,
            hosts_known,
            agents_active,
            directory_local,
            directory_remote,
        } => {
            let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());
            let obj = serde_json::json!({
                "status": "running",
                "version": version,
                "uptime_secs": uptime_secs,
                "hosts_known": hosts_known,
                "agents_active": agents_active,
                "directory_local": directory_local,
                "directory_remote": directory_remote,
            });
            format_or_json(format, &obj, || {
                println!("Status: running");
                println!("Version: {}", version);
                println!("Uptime: {}", format_elapsed(uptime_secs));
                println!("Hosts: {} known", hosts_known);
                println!("Agents: {} active", agents_active);
                println!(
                    "Directory: {} local, {} remote",
                    directory_local, directory_remote
                );
            })
        }
        other => Err(anyhow!("unexpected response: {:?}", other)),
    }
}

/// Locate the hived binary next to the hive binary.
fn find_hived_binary() -> Result<std::path::PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| anyhow!("cannot resolve binary directory"))?;
    let hived = dir.join("hived");
    if hived.exists() {
        return Ok(hived);
    }
    // Fall back to PATH
    Ok(std::path::PathBuf::from("hived"))
}
